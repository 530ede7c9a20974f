//! Error types for cliptray-core

use thiserror::Error;

/// Result type alias using cliptray-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cliptray-core operations
///
/// Every variant is recoverable: callers surface a notice and carry on.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or timeout talking to the capture backend
    #[error("Backend unreachable: {0}")]
    UnreachableBackend(String),

    /// Backend answered with a payload we could not decode
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// Backend answered with a non-success status
    #[error("Backend rejected request (HTTP {status}): {message}")]
    BackendRejected { status: u16, message: String },

    /// A bulk action found nothing to act on
    #[error("Nothing to act on: {0}")]
    EmptyTargetSet(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the backend could not be reached at all.
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::UnreachableBackend(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else if let Some(status) = error.status() {
            Self::BackendRejected {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            Self::UnreachableBackend(error.to_string())
        }
    }
}
