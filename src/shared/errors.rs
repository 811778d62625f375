//! Strict error handling with CoreError enum
//!
//! All recoverable conditions are surfaced as explicit results; none of
//! them may stop the polling loop or leave the category map inconsistent.
//! Errors are serializable so an external presentation layer can render
//! them directly.

use serde::Serialize;
use thiserror::Error;

/// Core operation errors
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CoreError {
    /// The named category does not exist in the category map
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The item text is in neither the pinned nor the unpinned list
    #[error("Item not found in category '{0}'")]
    ItemNotFound(String),

    /// A regex rule failed to compile (the rule becomes inert, never fatal)
    #[error("Invalid rule pattern '{pattern}': {message}")]
    InvalidRulePattern { pattern: String, message: String },

    /// Clipboard is empty or cannot be read right now (retried next tick)
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// Saving the config failed; in-memory state is retained
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Attempted to delete a category that must always exist
    #[error("Category '{0}' cannot be deleted")]
    ProtectedCategory(String),

    /// Invalid input or parameter (empty name, empty rule, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// System I/O error (file operations, etc.)
    #[error("System I/O error: {0}")]
    SystemIO(String),
}

// Implement From for common error types
impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::SystemIO(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::PersistenceFailure(format!("JSON error: {}", err))
    }
}

// Helper type alias for core results
pub type CoreResult<T> = Result<T, CoreError>;
