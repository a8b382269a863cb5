//! Write-through decorator persisting successfully loaded photos.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Url;
use tracing::warn;

use crate::domain::errors::PhotoError;
use crate::domain::ports::{PhotoCache, PhotoLoader};
use crate::domain::task::{Completion, LoadTask};

/// Saves every photo the wrapped loader delivers, then forwards the result
/// unchanged. The outcome of the save does not reach the caller.
pub struct CachingPhotoLoader<L, C> {
    loader: L,
    cache: Arc<C>,
}

impl<L, C> CachingPhotoLoader<L, C>
where
    L: PhotoLoader,
    C: PhotoCache + 'static,
{
    /// Wraps `loader`, writing its results into `cache`.
    #[must_use]
    pub fn new(loader: L, cache: C) -> Self {
        Self {
            loader,
            cache: Arc::new(cache),
        }
    }
}

impl<L, C> PhotoLoader for CachingPhotoLoader<L, C>
where
    L: PhotoLoader,
    C: PhotoCache + 'static,
{
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask> {
        let cache = Arc::clone(&self.cache);
        let loaded_url = url.clone();

        self.loader.load(
            url,
            Box::new(move |result| {
                if let Ok(data) = &result {
                    let failed_url = loaded_url.clone();
                    cache.save(
                        data.clone(),
                        &loaded_url,
                        Box::new(move |saved| {
                            if let Err(e) = saved {
                                warn!(url = %failed_url, error = %e, "Failed to cache photo");
                            }
                        }),
                    );
                }
                completion(result);
            }),
        )
    }
}
