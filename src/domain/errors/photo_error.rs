//! Photo loading error types.

use thiserror::Error;

use super::StoreError;

/// Failure of a photo loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    /// The remote photo could not be reached.
    #[error("could not reach the photo server")]
    Connectivity,

    /// The remote answered with a bad status or an empty body.
    #[error("photo response was not valid")]
    InvalidData,

    /// The local store failed.
    #[error("photo store failed: {0}")]
    StoreFailed(#[from] StoreError),

    /// No fresh local copy exists.
    #[error("no cached photo")]
    NotFound,
}
