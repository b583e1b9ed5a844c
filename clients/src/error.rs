//! Errors shared by all external-service clients.

use thiserror::Error;

/// Errors that can occur when calling an external service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is empty or not absolute.
    #[error("invalid base URL for {service}: {reason}")]
    Config {
        service: &'static str,
        reason: String,
    },

    /// The request could not be sent, or the connection failed (including after retries).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    /// The service responded with a non-2xx status.
    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("{service} returned an unexpected response shape: {0}")]
    Decode(String),
}

impl ClientError {
    /// The HTTP status code, when this error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is a 404 Not Found, used by the memory-block manager to
    /// decide between updating an existing block and creating a new one.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
