//! Petshelf - browse adoptable shelter pets with locally cached photos.
//!
//! This crate fetches pages of adoptable animals from the public adoption
//! open-data service and loads their photos through a pipeline that serves
//! fresh local copies first and writes remote downloads back to disk.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing loaders and their composition.
pub mod application;
/// Domain layer containing entities, errors, task primitives and ports.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "petshelf";
