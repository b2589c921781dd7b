//! Chat message model and the bounded history window sent with each query.

use rag_chat_client::HistoryTurn;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the conversation. Append-only, except that the last entry's
/// text is updated in place while a response streams in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// Empty bot entry appended before the stream opens.
    pub fn bot_placeholder() -> Self {
        Self {
            sender: Sender::Bot,
            text: String::new(),
        }
    }
}

/// Pair completed user/bot turns and keep the most recent `n`, bounding the
/// context sent with each new question.
pub fn history_window(messages: &[ChatMessage], n: usize) -> Vec<HistoryTurn> {
    let mut turns = Vec::new();
    let mut index = 0;
    while index + 1 < messages.len() {
        if messages[index].sender == Sender::User && messages[index + 1].sender == Sender::Bot {
            turns.push(HistoryTurn(
                messages[index].text.clone(),
                messages[index + 1].text.clone(),
            ));
            index += 2;
        } else {
            index += 1;
        }
    }
    if turns.len() > n {
        turns.drain(0..turns.len() - n);
    }
    turns
}
