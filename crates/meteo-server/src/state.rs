//! Shared handler state and the wiring that builds it from configuration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meteo_core::Config;
use meteo_weather::{
    BackgroundRefresher, Clock, Fetcher, Location, ProviderSettings, RefreshCoordinator,
    SystemClock, WeatherCache, WeatherProvider, WeatherQuery,
};

/// State handed to every route.
pub struct AppState<F: Fetcher> {
    pub query: WeatherQuery<F>,
    pub clock: Arc<dyn Clock>,
}

impl<F: Fetcher> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<F: Fetcher> AppState<F> {
    pub fn new(query: WeatherQuery<F>, clock: Arc<dyn Clock>) -> Self {
        Self { query, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// A fully wired service: handler state plus the refresher that keeps the
/// same cache warm.
pub struct Service {
    pub state: AppState<WeatherProvider>,
    pub refresher: BackgroundRefresher<WeatherProvider, SystemClock>,
}

impl Service {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let location = Location {
            latitude: config.weather.latitude,
            longitude: config.weather.longitude,
        };
        let settings = ProviderSettings::new(location)
            .with_base_url(config.weather.base_url.clone())
            .with_timeout(config.weather.request_timeout());
        let provider = WeatherProvider::new(settings)?;

        let cache = Arc::new(WeatherCache::new());
        let coordinator = RefreshCoordinator::new(provider, cache, config.cache.ttl());
        let query =
            WeatherQuery::new(coordinator.clone()).with_serve_stale(config.cache.serve_stale);
        let refresher =
            BackgroundRefresher::new(coordinator, SystemClock, config.cache.refresh_period());

        tracing::info!(
            latitude = location.latitude,
            longitude = location.longitude,
            ttl_secs = config.cache.ttl_secs,
            refresh_secs = config.cache.refresh_secs,
            serve_stale = config.cache.serve_stale,
            "Weather service configured"
        );

        Ok(Self {
            state: AppState::new(query, Arc::new(SystemClock)),
            refresher,
        })
    }
}
