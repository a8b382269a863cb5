//! Pet list loading error types.

use thiserror::Error;

/// Failure to load a page of pets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum PetListError {
    #[error("could not reach the pet list service")]
    Connectivity,

    #[error("pet list response was not valid")]
    InvalidData,
}
