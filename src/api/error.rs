//! Errors returned by the key service

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The server could not be reached
    #[error("Cannot reach server: {0}")]
    Connection(String),

    /// Non-2xx response; `message` is the server's error text or a fallback
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the server refused the request (4xx), as opposed to failing
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }

    /// Text for the operator: the server's message when it sent one,
    /// otherwise `fallback` with the transport error appended
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => format!("{fallback}: {other}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}
