//! The chat widget state machine: input text, error banner, generating flag,
//! and the ordered message list. The submit cycle opens one stream, merges
//! run-log patches into the last message as they arrive, and always clears
//! the generating flag on the way out.

use rag_chat_client::{
    find_mode, ChatApiClient, ClientError, QueryPayload, RunLog, SCHEMA_MODE,
};

use crate::message::{history_window, ChatMessage};

/// Prior turns included with each outgoing question.
pub const HISTORY_WINDOW: usize = 3;

/// Keys the widget cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

/// One key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

/// What the caller should do after handing the widget a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Plain Enter: the default newline is suppressed; run `submit`.
    Submit,
    /// The key was applied to the input text.
    Consumed,
}

/// Result of one submit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stream ran to completion; the last message holds the final output.
    Completed,
    /// Request setup or streaming failed; the error banner is set.
    Failed,
    /// Input was empty after trimming; nothing changed.
    EmptyInput,
    /// A stream is already active; the submit was rejected.
    InFlight,
    /// The selected mode is not in the catalog; the error banner is set.
    InvalidMode,
}

/// Chat widget bound to one backend client and one selected retrieval mode.
#[derive(Debug)]
pub struct ChatWidget {
    client: ChatApiClient,
    mode: String,
    input: String,
    error: Option<String>,
    generating: bool,
    messages: Vec<ChatMessage>,
}

impl ChatWidget {
    pub fn new(client: ChatApiClient, mode: impl Into<String>) -> Self {
        Self {
            client,
            mode: mode.into(),
            input: String::new(),
            error: None,
            generating: false,
            messages: Vec::new(),
        }
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: impl Into<String>) {
        self.mode = mode.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Apply one key press to the input. Plain Enter requests a submit and
    /// suppresses the default newline; Shift+Enter inserts the newline.
    pub fn handle_key(&mut self, press: KeyPress) -> InputAction {
        match press.key {
            Key::Enter if !press.shift => InputAction::Submit,
            Key::Enter => {
                self.input.push('\n');
                InputAction::Consumed
            }
            Key::Char(c) => {
                self.input.push(c);
                InputAction::Consumed
            }
        }
    }

    /// Send the current input as a question and stream the answer into a new
    /// bot message. See `SubmitOutcome` for the possible results; the
    /// generating flag is cleared on every exit path that set it.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.submit_with(|_| {}).await
    }

    /// Like `submit`, but calls `on_update` with the message list after each
    /// merged patch, so a frontend can redraw the streaming transcript
    /// (including the loading marker) while the stream is open.
    pub async fn submit_with<F>(&mut self, mut on_update: F) -> SubmitOutcome
    where
        F: FnMut(&[ChatMessage]),
    {
        if self.input.trim().is_empty() {
            return SubmitOutcome::EmptyInput;
        }
        if self.generating {
            return SubmitOutcome::InFlight;
        }
        let mode = match find_mode(&self.mode) {
            Ok(mode) => mode,
            Err(e) => {
                self.error = Some(e.to_string());
                return SubmitOutcome::InvalidMode;
            }
        };

        // History covers turns completed before this question.
        let history = history_window(&self.messages, HISTORY_WINDOW);
        let question = std::mem::take(&mut self.input);

        self.messages.push(ChatMessage::user(question.clone()));
        self.error = None;
        self.generating = true;
        self.messages.push(ChatMessage::bot_placeholder());

        let last = self.messages.len() - 1;
        let mut log = RunLog::default();
        let messages = &mut self.messages;
        let result = self
            .client
            .stream_query(
                mode.endpoint,
                &QueryPayload::new(&question, &history, mode.name),
                |patch| {
                    log.apply(&patch);
                    messages[last].text = log.final_output().unwrap_or("").to_string();
                    on_update(messages);
                },
            )
            .await;

        self.generating = false;
        match result {
            Ok(()) => SubmitOutcome::Completed,
            Err(e) => {
                self.error = Some(format!("Error querying server: {}", e));
                SubmitOutcome::Failed
            }
        }
    }

    /// True only for the schema-driven mode; gates the refresh affordance.
    pub fn can_refresh_schema(&self) -> bool {
        self.mode == SCHEMA_MODE
    }

    /// On-demand schema refresh, independent of the chat stream.
    pub async fn refresh_schema(&self) -> Result<(), ClientError> {
        self.client.refresh_schema().await
    }

    /// Plain-text rendering: one line per message with a sender prefix, a
    /// loading marker on the streaming bot line, and the error banner last.
    pub fn transcript(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (index, message) in self.messages.iter().enumerate() {
            let prefix = match message.sender {
                crate::message::Sender::User => "you",
                crate::message::Sender::Bot => "bot",
            };
            let mut line = format!("[{}] {}", prefix, message.text);
            if self.generating && index + 1 == self.messages.len() {
                line.push_str(" ...");
            }
            lines.push(line);
        }
        if let Some(error) = &self.error {
            lines.push(format!("[error] {}", error));
        }
        lines
    }
}
