//! Photo loaders that depend only on domain ports.

mod caching_photo_loader;
mod dispatching;
mod fallback_photo_loader;
mod local_photo_loader;

pub use caching_photo_loader::CachingPhotoLoader;
pub use dispatching::{ChannelDispatcher, Dispatcher, Dispatching, ImmediateDispatcher, Job};
pub use fallback_photo_loader::FallbackPhotoLoader;
pub use local_photo_loader::{Clock, LocalPhotoLoader};
