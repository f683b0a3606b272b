//! Error types for client operations

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base URL cannot carry path segments (e.g. `mailto:`)
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server rejected the request body or path (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Gateway not found (404)
    #[error("Gateway not found: {0}")]
    GatewayNotFound(String),

    /// Device not found in the gateway (404)
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Server returned any other error response
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl ClientError {
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status behind this error, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::BadRequest(_) => Some(400),
            ClientError::GatewayNotFound(_) | ClientError::DeviceNotFound(_) => Some(404),
            ClientError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
