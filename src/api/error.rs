//! API error types for the JIRA client.
//!
//! These errors are internal to the crate: public client methods never
//! return them. Each operation catches the error at its own call site,
//! reports it through `tracing`, and degrades to the documented sentinel
//! value (empty vec, empty map, `None`, `false`).

use thiserror::Error;

/// Faults that can occur while talking to the JIRA API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - invalid identifier or API token.
    #[error("authentication failed: check your identifier and API token")]
    Unauthorized,

    /// Resource not found.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The server answered with a status outside the operation's contract.
    #[error("unexpected HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Transport-level fault (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("malformed API response: {0}")]
    Malformed(String),
}

/// Result type for internal API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from a non-success HTTP status and response body.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(body.to_string()),
            _ => ApiError::Status {
                status,
                body: body.to_string(),
            },
        }
    }
}
