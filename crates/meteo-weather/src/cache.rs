//! In-memory store for the most recent forecast snapshot.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::types::Snapshot;

/// A snapshot and the time it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    snapshot: Arc<Snapshot>,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(snapshot: Arc<Snapshot>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            snapshot,
            fetched_at,
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing has been fetched successfully yet.
    Empty,
    Populated,
}

/// Holds zero or one [`CacheEntry`].
///
/// Loads and stores only hold the lock long enough to swap an `Arc`. Once
/// populated the store never becomes empty again, and an entry older than
/// the current one is never stored.
#[derive(Debug, Default)]
pub struct WeatherCache {
    entry: RwLock<Option<Arc<CacheEntry>>>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().clone()
    }

    /// Replace the current entry. Returns false, leaving the store as it
    /// was, when `entry` was fetched before the current one.
    pub fn store(&self, entry: CacheEntry) -> bool {
        let mut slot = self.entry.write();
        if let Some(current) = slot.as_ref() {
            if entry.fetched_at < current.fetched_at {
                return false;
            }
        }
        *slot = Some(Arc::new(entry));
        true
    }

    pub fn state(&self) -> CacheState {
        if self.entry.read().is_some() {
            CacheState::Populated
        } else {
            CacheState::Empty
        }
    }
}
