use chrono::{DateTime, Duration, Utc};

use crate::cache::CacheEntry;

/// Whether `entry` may be served at `now` without refetching.
///
/// An entry exactly `ttl` old is stale. A missing entry is never fresh.
pub fn is_fresh(entry: Option<&CacheEntry>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match entry {
        Some(entry) => now - entry.fetched_at() < ttl,
        None => false,
    }
}
