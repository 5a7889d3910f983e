//! Error types for MailHog API calls.

use thiserror::Error;

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-success status.
    #[error("an error occurred while executing the query (status code: {status}, reason: {reason})")]
    Status { status: u16, reason: String },

    /// Transport failure, or the HTTP client could not be built.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body did not match the expected envelope shape.
    #[error("cannot decode response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The HTTP status code behind this error, if the server sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Request(err) => err.status().map(|s| s.as_u16()),
            Error::Json(_) => None,
        }
    }
}
