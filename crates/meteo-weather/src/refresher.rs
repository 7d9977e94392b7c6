//! Background refresher: keeps the weather cache warm without request traffic.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::coordinator::RefreshCoordinator;
use crate::error::FetchError;
use crate::provider::Fetcher;
use crate::types::Snapshot;

/// Shortest period the loop will run at.
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Refreshes the cache every `period`, starting one period after spawn.
pub struct BackgroundRefresher<F: Fetcher, C: Clock> {
    coordinator: RefreshCoordinator<F>,
    clock: C,
    period: Duration,
}

impl<F: Fetcher, C: Clock> BackgroundRefresher<F, C> {
    /// A period below one second is raised to one second.
    pub fn new(coordinator: RefreshCoordinator<F>, clock: C, period: Duration) -> Self {
        let period = if period < MIN_PERIOD {
            tracing::warn!(
                requested_ms = period.as_millis() as u64,
                "Refresh period too short, using {}s",
                MIN_PERIOD.as_secs()
            );
            MIN_PERIOD
        } else {
            period
        };
        Self {
            coordinator,
            clock,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one refresh. Failures are logged here and returned for callers
    /// that want them; the periodic loop ignores them.
    pub async fn tick(&self) -> Result<Arc<Snapshot>, FetchError> {
        let now = self.clock.now();
        let result = self.coordinator.background_tick(now).await;
        match &result {
            Ok(_) => tracing::debug!("Background weather refresh complete"),
            Err(e) => tracing::warn!(
                error = %e,
                retry_in_secs = self.period.as_secs(),
                "Background weather refresh failed"
            ),
        }
        result
    }

    /// Spawn the periodic loop. It stops when `cancel` is triggered.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(period_secs = self.period.as_secs(), "Background weather refresher started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = self.tick() => {}
                }
            }

            tracing::info!("Background weather refresher stopped");
        })
    }
}
