//! Photo adapters.
//!
//! This module provides:
//! - HTTP photo downloads
//! - A disk-backed photo store

pub mod file_store;
pub mod remote_photo_loader;

pub use file_store::FilePhotoStore;
pub use remote_photo_loader::RemotePhotoLoader;
