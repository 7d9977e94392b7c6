//! Read-only projections over the cached forecast.
//!
//! Every projection reads through [`RefreshCoordinator::get_current`], so a
//! stale cache is refreshed on demand no matter which view is requested.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coordinator::RefreshCoordinator;
use crate::error::QueryError;
use crate::provider::Fetcher;
use crate::types::{CurrentConditions, CurrentUnits, HourlySeries, Snapshot, WeatherCondition};

/// Current observation together with its unit labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub current: CurrentConditions,
    pub current_units: CurrentUnits,
    pub condition: WeatherCondition,
    /// Display label for `condition`
    pub description: &'static str,
}

pub struct WeatherQuery<F: Fetcher> {
    coordinator: RefreshCoordinator<F>,
    serve_stale: bool,
}

impl<F: Fetcher> Clone for WeatherQuery<F> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            serve_stale: self.serve_stale,
        }
    }
}

impl<F: Fetcher> WeatherQuery<F> {
    pub fn new(coordinator: RefreshCoordinator<F>) -> Self {
        Self {
            coordinator,
            serve_stale: true,
        }
    }

    /// Whether a failed refresh may fall back to the last good snapshot.
    pub fn with_serve_stale(mut self, serve_stale: bool) -> Self {
        self.serve_stale = serve_stale;
        self
    }

    pub fn coordinator(&self) -> &RefreshCoordinator<F> {
        &self.coordinator
    }

    /// The whole forecast document.
    pub async fn full(&self, now: DateTime<Utc>) -> Result<Arc<Snapshot>, QueryError> {
        self.snapshot(now).await
    }

    /// The hourly series only.
    pub async fn hourly(&self, now: DateTime<Utc>) -> Result<HourlySeries, QueryError> {
        let snapshot = self.snapshot(now).await?;
        Ok(snapshot.hourly.clone())
    }

    /// The current observation and its units.
    pub async fn current(&self, now: DateTime<Utc>) -> Result<CurrentView, QueryError> {
        let snapshot = self.snapshot(now).await?;
        let condition = snapshot.current.condition();
        Ok(CurrentView {
            current: snapshot.current.clone(),
            current_units: snapshot.current_units.clone(),
            condition,
            description: condition.description(),
        })
    }

    async fn snapshot(&self, now: DateTime<Utc>) -> Result<Arc<Snapshot>, QueryError> {
        let cause = match self.coordinator.get_current(now).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) => e,
        };

        match self.coordinator.cache().load() {
            None => Err(QueryError::NotYetAvailable(cause)),
            Some(entry) if self.serve_stale => {
                tracing::warn!(
                    age_secs = entry.age(now).num_seconds(),
                    error = %cause,
                    "Serving stale weather after failed refresh"
                );
                Ok(entry.snapshot())
            }
            Some(_) => Err(QueryError::Fetch(cause)),
        }
    }
}
