//! Local photo store port definition.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::domain::entities::CachedPhoto;
use crate::domain::errors::StoreError;
use crate::domain::task::Completion;

/// Port for the on-disk photo store.
///
/// Operations on one store run one at a time in submission order. Completions
/// fire on the store's own execution context.
pub trait PhotoStore: Send + Sync {
    /// Looks up the record for `url`.
    fn retrieve(&self, url: &Url, completion: Completion<Option<CachedPhoto>, StoreError>);

    /// Stores `data` for `url`, replacing any previous record.
    fn insert(
        &self,
        data: Bytes,
        url: &Url,
        timestamp: DateTime<Utc>,
        completion: Completion<(), StoreError>,
    );

    /// Removes the record for `url`. Removing a missing record succeeds.
    fn delete(&self, url: &Url, completion: Completion<(), StoreError>);
}

impl<T: PhotoStore + ?Sized> PhotoStore for std::sync::Arc<T> {
    fn retrieve(&self, url: &Url, completion: Completion<Option<CachedPhoto>, StoreError>) {
        (**self).retrieve(url, completion);
    }

    fn insert(
        &self,
        data: Bytes,
        url: &Url,
        timestamp: DateTime<Utc>,
        completion: Completion<(), StoreError>,
    ) {
        (**self).insert(data, url, timestamp, completion);
    }

    fn delete(&self, url: &Url, completion: Completion<(), StoreError>) {
        (**self).delete(url, completion);
    }
}
