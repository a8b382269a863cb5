//! Locally persisted photo record.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::domain::cache_policy::CachePolicy;

/// Photo bytes stored for a URL together with the instant they were stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPhoto {
    /// Owning URL, unique per store.
    pub url: Url,
    /// Raw image payload.
    pub data: Bytes,
    /// Insertion time.
    pub timestamp: DateTime<Utc>,
}

impl CachedPhoto {
    /// Creates a record.
    #[must_use]
    pub fn new(url: Url, data: Bytes, timestamp: DateTime<Utc>) -> Self {
        Self {
            url,
            data,
            timestamp,
        }
    }

    /// Returns true if the record may still be served at `now`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        CachePolicy::is_fresh(self.timestamp, now)
    }
}
