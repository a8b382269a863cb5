//! Freshness rule for cached photos.

use chrono::{DateTime, TimeDelta, Utc};

/// Number of days a cached photo stays valid.
pub const MAX_CACHE_AGE_DAYS: i64 = 7;

/// Age-based validation evaluated at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy;

impl CachePolicy {
    /// Maximum age of a cached record.
    #[must_use]
    pub fn max_age() -> TimeDelta {
        TimeDelta::days(MAX_CACHE_AGE_DAYS)
    }

    /// Returns true if a record stored at `timestamp` is still fresh at `now`.
    ///
    /// The boundary instant `timestamp + max_age` is already stale.
    #[must_use]
    pub fn is_fresh(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        timestamp
            .checked_add_signed(Self::max_age())
            .is_some_and(|expiry| now < expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
            .single()
            .expect("valid date")
    }

    #[test]
    fn test_fresh_just_before_expiry() {
        let now = fixed_now();
        let timestamp = now - CachePolicy::max_age() + TimeDelta::seconds(1);
        assert!(CachePolicy::is_fresh(timestamp, now));
    }

    #[test]
    fn test_stale_exactly_at_expiry() {
        let now = fixed_now();
        let timestamp = now - CachePolicy::max_age();
        assert!(!CachePolicy::is_fresh(timestamp, now));
    }

    #[test]
    fn test_stale_after_expiry() {
        let now = fixed_now();
        let timestamp = now - CachePolicy::max_age() - TimeDelta::seconds(1);
        assert!(!CachePolicy::is_fresh(timestamp, now));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let now = fixed_now();
        assert!(CachePolicy::is_fresh(now + TimeDelta::days(1), now));
    }
}
