//! Error types for the sync engine

use thiserror::Error;

/// Errors that can occur during a git transport operation
#[derive(Debug, Error)]
pub enum GitError {
    /// The underlying git operation failed
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// A filesystem operation failed
    #[error("filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking git task could not be joined
    #[error("background git task failed: {0}")]
    Task(String),
}
