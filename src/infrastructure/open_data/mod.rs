//! Adoption open-data service client.

pub mod dto;
pub mod pet_list_loader;

pub use pet_list_loader::{DATASET_UNIT_ID, DEFAULT_ENDPOINT, RemotePetLoader};
