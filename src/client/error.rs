//! Client signer errors.

use std::time::Duration;

use thiserror::Error;

/// Longest excerpt of a rejected response kept in the error message.
pub const MAX_ERROR_EXCERPT: usize = 200;

/// Errors that can occur while issuing a signed request.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The call did not complete within the configured timeout.
    #[error("Request timeout after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Connection or protocol failure before a response arrived.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body could not be serialized to JSON.
    #[error("Invalid request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The base URL or path could not form a request URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Build a rejection from a status and response text.
    ///
    /// The message is the first 200 characters of the body, or `HTTP <status>`
    /// when the body is empty.
    pub fn rejected(status: u16, text: &str) -> Self {
        let excerpt: String = text.chars().take(MAX_ERROR_EXCERPT).collect();
        let message = if excerpt.is_empty() {
            format!("HTTP {}", status)
        } else {
            excerpt
        };
        ClientError::Rejected { status, message }
    }

    /// HTTP status when the server rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}

/// Result type for signed client calls.
pub type ClientResult<T> = Result<T, ClientError>;
