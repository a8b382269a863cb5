//! Assembly of the photo loading pipeline.
//!
//! ```text
//! Fallback ── primary ──> LocalPhotoLoader
//!          └─ fallback ─> CachingPhotoLoader(remote) ──save──> LocalPhotoLoader
//! ```

use std::sync::Arc;

use crate::application::loaders::{CachingPhotoLoader, FallbackPhotoLoader};
use crate::domain::ports::{PhotoCache, PhotoLoader};

/// Photo loader serving local copies and falling back to a write-through
/// remote load.
pub type PhotoPipeline<L, R> = FallbackPhotoLoader<Arc<L>, CachingPhotoLoader<R, Arc<L>>>;

/// Composes `local` and `remote` into a [`PhotoPipeline`].
///
/// `local` is asked first. On any local failure `remote` is asked, and what it
/// delivers is saved back into `local`.
#[must_use]
pub fn compose_photo_pipeline<L, R>(local: Arc<L>, remote: R) -> PhotoPipeline<L, R>
where
    L: PhotoLoader + PhotoCache + 'static,
    R: PhotoLoader + 'static,
{
    let write_through = CachingPhotoLoader::new(remote, Arc::clone(&local));
    FallbackPhotoLoader::new(local, write_through)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::loaders::LocalPhotoLoader;
    use crate::domain::entities::CachedPhoto;
    use crate::domain::errors::PhotoError;
    use crate::domain::ports::mocks::{PhotoLoaderSpy, PhotoStoreSpy, StoreMessage};
    use crate::domain::task::LoadTask;
    use bytes::Bytes;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use parking_lot::Mutex;
    use reqwest::Url;

    type Received = Arc<Mutex<Vec<Result<Bytes, PhotoError>>>>;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 20, 18, 0, 0)
            .single()
            .expect("valid date")
    }

    fn url() -> Url {
        Url::parse("https://shelter.test/album/42.png").expect("valid url")
    }

    struct Harness {
        pipeline: PhotoPipeline<LocalPhotoLoader<Arc<PhotoStoreSpy>>, Arc<PhotoLoaderSpy>>,
        store: Arc<PhotoStoreSpy>,
        remote: Arc<PhotoLoaderSpy>,
    }

    fn harness() -> Harness {
        let store = PhotoStoreSpy::new();
        let remote = PhotoLoaderSpy::new();
        let local = LocalPhotoLoader::with_clock(Arc::clone(&store), Arc::new(now));
        Harness {
            pipeline: compose_photo_pipeline(Arc::new(local), Arc::clone(&remote)),
            store,
            remote,
        }
    }

    fn load(h: &Harness) -> (Box<dyn LoadTask>, Received) {
        let received: Received = Arc::default();
        let sink = Arc::clone(&received);
        let task = h.pipeline.load(&url(), Box::new(move |r| sink.lock().push(r)));
        (task, received)
    }

    #[test]
    fn test_fresh_local_copy_skips_remote() {
        let h = harness();
        let (_task, received) = load(&h);

        let cached = CachedPhoto::new(
            url(),
            Bytes::from_static(b"cached"),
            now() - TimeDelta::days(1),
        );
        h.store.complete_retrieval(0, Ok(Some(cached)));

        assert!(h.remote.loaded_urls().is_empty());
        assert_eq!(*received.lock(), vec![Ok(Bytes::from_static(b"cached"))]);
    }

    #[test]
    fn test_local_miss_loads_remote_and_writes_through() {
        let h = harness();
        let (_task, received) = load(&h);
        let data = Bytes::from_static(b"fresh from server");

        h.store.complete_retrieval(0, Ok(None));
        h.remote.complete(0, Ok(data.clone()));

        assert_eq!(h.remote.loaded_urls(), vec![url()]);
        assert_eq!(
            h.store.messages(),
            vec![
                StoreMessage::Retrieve(url()),
                StoreMessage::Insert(data.clone(), url(), now()),
            ]
        );
        assert_eq!(*received.lock(), vec![Ok(data)]);
    }

    #[test]
    fn test_expired_local_copy_loads_remote() {
        let h = harness();
        let (_task, _received) = load(&h);

        let stale = CachedPhoto::new(
            url(),
            Bytes::from_static(b"old"),
            now() - TimeDelta::days(8),
        );
        h.store.complete_retrieval(0, Ok(Some(stale)));

        assert_eq!(h.remote.loaded_urls(), vec![url()]);
    }

    #[test]
    fn test_remote_failure_is_delivered_without_write() {
        let h = harness();
        let (_task, received) = load(&h);

        h.store.complete_retrieval(0, Ok(None));
        h.remote.complete(0, Err(PhotoError::Connectivity));

        assert_eq!(h.store.messages(), vec![StoreMessage::Retrieve(url())]);
        assert_eq!(*received.lock(), vec![Err(PhotoError::Connectivity)]);
    }

    #[test]
    fn test_cancel_during_remote_load_cancels_remote() {
        let h = harness();
        let (task, received) = load(&h);

        h.store.complete_retrieval(0, Ok(None));
        task.cancel();
        h.remote.complete(0, Ok(Bytes::from_static(b"late")));

        assert_eq!(h.remote.cancelled_urls(), vec![url()]);
        assert!(received.lock().is_empty());
    }
}
