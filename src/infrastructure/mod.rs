//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// HTTP transport.
pub mod http;
/// Photo download and storage.
pub mod image;
/// Adoption open-data client.
pub mod open_data;

pub use config::{AppConfig, CliArgs, Command, ConfigError, LogLevel, StorageManager};
pub use http::ReqwestHttpClient;
pub use image::{FilePhotoStore, RemotePhotoLoader};
pub use open_data::RemotePetLoader;
