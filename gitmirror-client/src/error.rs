//! Error types for the directory client

use thiserror::Error;

/// Result type alias for listing operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while listing an organization's repositories
///
/// Any of these aborts the whole listing for the organization; pages
/// accumulated before the failure are discarded.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse a page of the response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }
}
