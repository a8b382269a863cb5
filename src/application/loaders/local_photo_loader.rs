//! Photo loader backed by the local photo store.

use std::sync::{Arc, Weak};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;
use tracing::{debug, trace, warn};

use crate::domain::entities::CachedPhoto;
use crate::domain::errors::{PhotoError, StoreError};
use crate::domain::ports::{PhotoCache, PhotoLoader, PhotoStore};
use crate::domain::task::{Completion, CompletionSlot, LoadTask};

/// Source of the current instant.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Serves fresh photos from a [`PhotoStore`] and saves new ones into it.
///
/// Stale records are reported as [`PhotoError::NotFound`], the same as
/// missing ones. Completions are dropped once the loader itself is dropped.
pub struct LocalPhotoLoader<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    store: S,
    clock: Clock,
}

impl<S: PhotoStore + 'static> LocalPhotoLoader<S> {
    /// Creates a loader reading the system clock.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(Utc::now))
    }

    /// Creates a loader with an injected clock.
    #[must_use]
    pub fn with_clock(store: S, clock: Clock) -> Self {
        Self {
            inner: Arc::new(Inner { store, clock }),
        }
    }

    fn weak(&self) -> Weak<Inner<S>> {
        Arc::downgrade(&self.inner)
    }
}

fn map_retrieval(
    url: &Url,
    result: Result<Option<CachedPhoto>, StoreError>,
    now: DateTime<Utc>,
) -> Result<Bytes, PhotoError> {
    match result {
        Ok(Some(photo)) if photo.is_fresh_at(now) => {
            debug!(url = %url, "Serving photo from local store");
            Ok(photo.data)
        }
        Ok(Some(photo)) => {
            debug!(url = %url, stored_at = %photo.timestamp, "Local photo expired");
            Err(PhotoError::NotFound)
        }
        Ok(None) => {
            trace!(url = %url, "Local photo miss");
            Err(PhotoError::NotFound)
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to read local photo");
            Err(PhotoError::StoreFailed(e))
        }
    }
}

impl<S: PhotoStore + 'static> PhotoLoader for LocalPhotoLoader<S> {
    fn load(&self, url: &Url, completion: Completion<Bytes, PhotoError>) -> Box<dyn LoadTask> {
        let slot = CompletionSlot::new(completion);
        let delivery = slot.clone();
        let owner = self.weak();
        let requested = url.clone();

        self.inner.store.retrieve(
            url,
            Box::new(move |result| {
                let Some(inner) = owner.upgrade() else {
                    trace!(url = %requested, "Local loader dropped before retrieval finished");
                    return;
                };
                let now = (inner.clock)();
                delivery.complete(map_retrieval(&requested, result, now));
            }),
        );

        Box::new(slot)
    }
}

impl<S: PhotoStore + 'static> PhotoCache for LocalPhotoLoader<S> {
    fn save(&self, data: Bytes, url: &Url, completion: Completion<(), PhotoError>) {
        let owner = self.weak();
        let timestamp = (self.inner.clock)();
        let saved = url.clone();

        self.inner.store.insert(
            data,
            url,
            timestamp,
            Box::new(move |result| {
                if owner.upgrade().is_none() {
                    return;
                }
                if result.is_ok() {
                    debug!(url = %saved, "Saved photo locally");
                }
                completion(result.map_err(PhotoError::StoreFailed));
            }),
        );
    }
}

impl<S> std::fmt::Debug for LocalPhotoLoader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPhotoLoader").finish_non_exhaustive()
    }
}
