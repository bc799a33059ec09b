//! Error taxonomy for content resolution and editing.

use thiserror::Error;

/// Errors raised by content stores, the assembler and the admin editor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The content table could not be read (network, auth or server error).
    /// Public rendering recovers from this with the static dictionary.
    #[error("content source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// A save was attempted with missing required fields.
    #[error("{0}")]
    Validation(String),

    /// The row changed since the operator loaded it.
    #[error("content was modified by someone else: {0}")]
    WriteConflict(String),

    /// The database rejected a write.
    #[error("failed to save content: {0}")]
    Persistence(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl ContentError {
    /// Whether a public dictionary request should fall back to static content.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::DataSourceUnavailable(_))
    }
}

pub type ContentResult<T> = Result<T, ContentError>;
