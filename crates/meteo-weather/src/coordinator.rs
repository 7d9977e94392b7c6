//! Single-flight refresh over the weather cache.
//!
//! Every upstream fetch goes through [`RefreshCoordinator`]. At most one
//! refresh is in flight at a time; callers that need a refresh while one is
//! running wait for it and receive its outcome instead of starting another.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::cache::{CacheEntry, WeatherCache};
use crate::error::FetchError;
use crate::freshness::is_fresh;
use crate::provider::Fetcher;
use crate::types::Snapshot;

type Outcome = Result<Arc<Snapshot>, FetchError>;

/// The refresh currently running, if any.
#[derive(Default)]
struct FlightSlot {
    next_id: u64,
    current: Option<Flight>,
}

struct Flight {
    id: u64,
    outcome: watch::Receiver<Option<Outcome>>,
}

/// What a caller does after taking the flight lock.
enum Step {
    Cached(Arc<Snapshot>),
    Wait(watch::Receiver<Option<Outcome>>),
}

struct Inner<F> {
    fetcher: F,
    cache: Arc<WeatherCache>,
    ttl: chrono::Duration,
    flights: Mutex<FlightSlot>,
}

/// Clears the flight slot when the refresh task finishes, including when it
/// panics, so later callers start a new refresh instead of joining a dead one.
struct FlightGuard<F: Fetcher> {
    inner: Arc<Inner<F>>,
    id: u64,
}

impl<F: Fetcher> Drop for FlightGuard<F> {
    fn drop(&mut self) {
        let mut flights = self.inner.flights.lock();
        if flights.current.as_ref().map(|f| f.id) == Some(self.id) {
            flights.current = None;
        }
    }
}

pub struct RefreshCoordinator<F: Fetcher> {
    inner: Arc<Inner<F>>,
}

impl<F: Fetcher> Clone for RefreshCoordinator<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Fetcher> RefreshCoordinator<F> {
    pub fn new(fetcher: F, cache: Arc<WeatherCache>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            inner: Arc::new(Inner {
                fetcher,
                cache,
                ttl,
                flights: Mutex::new(FlightSlot::default()),
            }),
        }
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.inner.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.inner.ttl
    }

    /// Whether a refresh is running right now.
    pub fn is_refreshing(&self) -> bool {
        self.inner.flights.lock().current.is_some()
    }

    /// Return the cached snapshot if it is fresh at `now`, otherwise refresh.
    ///
    /// A failed refresh leaves the cache untouched and returns the error, even
    /// when a stale entry exists; the caller decides whether to serve it.
    pub async fn get_current(&self, now: DateTime<Utc>) -> Result<Arc<Snapshot>, FetchError> {
        if let Some(snapshot) = self.fresh_snapshot(now) {
            return Ok(snapshot);
        }

        match self.lead_if_stale(now) {
            Step::Cached(snapshot) => Ok(snapshot),
            Step::Wait(outcome) => Self::wait(outcome).await,
        }
    }

    /// Refresh regardless of freshness. Joins a refresh that is already
    /// running instead of starting a second one.
    pub async fn background_tick(&self, now: DateTime<Utc>) -> Result<Arc<Snapshot>, FetchError> {
        match self.join_or_lead(now, false) {
            Step::Cached(snapshot) => Ok(snapshot),
            Step::Wait(outcome) => Self::wait(outcome).await,
        }
    }

    fn fresh_snapshot(&self, now: DateTime<Utc>) -> Option<Arc<Snapshot>> {
        let entry = self.inner.cache.load()?;
        if !is_fresh(Some(&*entry), now, self.inner.ttl) {
            return None;
        }
        tracing::debug!(
            age_secs = entry.age(now).num_seconds(),
            "Weather served from cache"
        );
        Some(entry.snapshot())
    }

    /// Join or start a refresh, unless the cache turned fresh after the
    /// caller last looked. A refresh can finish and clear its slot between
    /// the caller's freshness check and taking the flight lock.
    fn lead_if_stale(&self, now: DateTime<Utc>) -> Step {
        self.join_or_lead(now, true)
    }

    async fn wait(mut outcome: watch::Receiver<Option<Outcome>>) -> Outcome {
        let result = match outcome.wait_for(Option::is_some).await {
            Ok(done) => (*done).clone().unwrap_or_else(|| Err(FetchError::aborted())),
            Err(_) => {
                tracing::warn!("Weather refresh ended without reporting an outcome");
                Err(FetchError::aborted())
            }
        };
        result
    }

    /// Subscribe to the running refresh, starting one if none is running.
    /// With `skip_if_fresh`, a fresh cache is returned instead of starting one.
    fn join_or_lead(&self, now: DateTime<Utc>, skip_if_fresh: bool) -> Step {
        let mut flights = self.inner.flights.lock();
        if let Some(flight) = &flights.current {
            tracing::debug!(flight = flight.id, "Joining in-flight weather refresh");
            return Step::Wait(flight.outcome.clone());
        }

        if skip_if_fresh {
            if let Some(snapshot) = self.fresh_snapshot(now) {
                return Step::Cached(snapshot);
            }
        }

        let id = flights.next_id;
        flights.next_id += 1;
        let (tx, rx) = watch::channel(None);
        flights.current = Some(Flight {
            id,
            outcome: rx.clone(),
        });
        drop(flights);

        // Runs detached so a cancelled caller can't strand the others.
        let guard = FlightGuard {
            inner: Arc::clone(&self.inner),
            id,
        };
        tokio::spawn(async move {
            let outcome = guard.inner.fetch_and_store(id, now).await;
            // Receivers may all be gone; nothing to report to then.
            let _ = tx.send(Some(outcome));
            drop(guard);
        });

        Step::Wait(rx)
    }
}

impl<F: Fetcher> Inner<F> {
    async fn fetch_and_store(&self, flight: u64, now: DateTime<Utc>) -> Outcome {
        tracing::debug!(flight, "Fetching weather from upstream");

        match self.fetcher.fetch().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let entry = CacheEntry::new(Arc::clone(&snapshot), now);
                if self.cache.store(entry) {
                    tracing::info!(flight, fetched_at = %now, "Weather cache refreshed");
                } else {
                    tracing::debug!(flight, "Newer weather entry already cached, keeping it");
                }
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!(flight, error = %e, "Weather refresh failed");
                Err(e)
            }
        }
    }
}
