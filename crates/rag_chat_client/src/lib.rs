//! Shared RAG chat client library (config, retrieval modes, stream-log
//! protocol, HTTP streaming). Used by the chat widget and the rag-chat TUI.

pub mod client;
pub mod config;
pub mod modes;
pub mod payload;
pub mod runlog;
pub mod sse;

pub use client::{ChatApiClient, ClientError};
pub use config::{default_config_path, ApiSection, ChatSection, Config, ConfigError};
pub use modes::{find_mode, RetrievalMode, UnknownModeError, RETRIEVAL_MODES, SCHEMA_MODE};
pub use payload::{HistoryTurn, QueryPayload};
pub use runlog::{PatchOp, RunLog, RunLogPatch};
