//! Fixed retrieval-mode catalog. Each mode names the server-side pipeline
//! that answers a question and the `/api/{endpoint}` path it lives under.

/// A named backend configuration: which pipeline and endpoint handle a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalMode {
    pub name: &'static str,
    pub endpoint: &'static str,
}

/// The fixed catalog. Selection is validated against this table on submit.
pub const RETRIEVAL_MODES: &[RetrievalMode] = &[
    RetrievalMode {
        name: "vector",
        endpoint: "vector-search",
    },
    RetrievalMode {
        name: "vector-graph",
        endpoint: "vector-graph-search",
    },
    RetrievalMode {
        name: "text2cypher",
        endpoint: "text2cypher",
    },
];

/// The one mode whose pipeline is driven by a database schema; gates the
/// "refresh schema" affordance.
pub const SCHEMA_MODE: &str = "text2cypher";

/// Look up a mode by name.
pub fn find_mode(name: &str) -> Result<&'static RetrievalMode, UnknownModeError> {
    RETRIEVAL_MODES
        .iter()
        .find(|mode| mode.name == name)
        .ok_or_else(|| UnknownModeError(name.to_string()))
}

/// Selected mode is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModeError(pub String);

impl std::fmt::Display for UnknownModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown retrieval mode: {}", self.0)
    }
}

impl std::error::Error for UnknownModeError {}
