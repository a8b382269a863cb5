//! HTTP transport error types.

use thiserror::Error;

/// Failure of a single HTTP dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum TransportError {
    /// The server could not be reached or the exchange broke off.
    #[error("connectivity error: {message}")]
    Connectivity { message: String },

    /// The request ended without data, error or response.
    #[error("request completed without a response")]
    UnexpectedCompletion,

    /// The client could not be built.
    #[error("failed to set up HTTP client: {message}")]
    Setup { message: String },
}

impl TransportError {
    /// Creates connectivity error.
    #[must_use]
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    /// Creates setup error.
    #[must_use]
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }
}
