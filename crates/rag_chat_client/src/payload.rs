//! Request payload sent to `/api/{endpoint}`. Client → server JSON.

use serde::Serialize;

/// One completed (question, answer) turn, serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryTurn(pub String, pub String);

/// Client → server: question plus bounded recent history and the mode name.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPayload<'a> {
    pub question: &'a str,
    pub chat_history: &'a [HistoryTurn],
    pub mode: &'a str,
}

impl<'a> QueryPayload<'a> {
    pub fn new(question: &'a str, chat_history: &'a [HistoryTurn], mode: &'a str) -> Self {
        Self {
            question,
            chat_history,
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_to_wire_shape() {
        let payload = QueryPayload::new("Hello", &[], "vector");
        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(
            json,
            serde_json::json!({"question": "Hello", "chat_history": [], "mode": "vector"})
        );
    }

    #[test]
    fn history_turns_serialize_as_pairs() {
        let history = vec![HistoryTurn("q1".into(), "a1".into())];
        let payload = QueryPayload::new("q2", &history, "vector");
        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(json["chat_history"], serde_json::json!([["q1", "a1"]]));
    }
}
