//! Photo store error types.

use thiserror::Error;

/// Photo store error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),

    #[error("corrupt store record: {0}")]
    Corrupt(String),

    #[error("store worker is no longer running")]
    Closed,
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
