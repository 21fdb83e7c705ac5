//! Error taxonomy for document session operations

use std::io;

use thiserror::Error;

/// Failures reported by the document session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The user dismissed a file dialog
    #[error("operation cancelled by user")]
    UserCancelled,

    /// A recent entry no longer resolves to a readable file
    #[error("recent document is no longer available: {path}")]
    StaleReference { path: String },

    /// The active backend cannot perform this operation
    #[error("not supported without file system access: {0}")]
    UnsupportedOperation(&'static str),

    /// Save was requested with no document open
    #[error("no document is open")]
    NoOpenDocument,

    /// Reading or writing the document failed
    #[error("failed to {action} {name}: {source}")]
    IoFailure {
        action: &'static str,
        name: String,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    pub fn io(action: &'static str, name: impl Into<String>, source: io::Error) -> Self {
        Self::IoFailure {
            action,
            name: name.into(),
            source,
        }
    }

    /// Whether the caller should stay silent about this error
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
