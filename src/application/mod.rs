//! Application layer composing loaders over domain ports.

/// Photo pipeline assembly.
pub mod composer;
/// Loader implementations and decorators.
pub mod loaders;

pub use composer::{PhotoPipeline, compose_photo_pipeline};
pub use loaders::{
    CachingPhotoLoader, ChannelDispatcher, Dispatcher, Dispatching, FallbackPhotoLoader,
    ImmediateDispatcher, LocalPhotoLoader,
};
