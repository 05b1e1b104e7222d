// src/error.rs
// Error types for the content-script core

use thiserror::Error;

/// Errors that stop an injection step outright.
///
/// Most DOM trouble is absorbed where it happens (logged, then skipped).
/// Only the failures that make a step impossible end up here.
#[derive(Error, Debug)]
pub enum InjectError {
    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("document has no body")]
    NoBody,

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("invalid page rule `{name}`: {source}")]
    Rule {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Convenience type alias for Result using InjectError
pub type Result<T> = std::result::Result<T, InjectError>;

impl From<String> for InjectError {
    fn from(s: String) -> Self {
        InjectError::Dom(s)
    }
}
