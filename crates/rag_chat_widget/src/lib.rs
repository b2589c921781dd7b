//! Chat widget for a RAG backend: ordered message list, input capture with
//! the Enter/Shift+Enter contract, and a submit cycle that streams the
//! response into the last message. Used by the rag-chat terminal binary.

pub mod message;
pub mod widget;

pub use message::{history_window, ChatMessage, Sender};
pub use widget::{ChatWidget, InputAction, Key, KeyPress, SubmitOutcome};
