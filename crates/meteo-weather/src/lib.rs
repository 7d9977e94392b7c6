//! Weather cache for Meteo
//!
//! Fetches forecasts from the Open-Meteo API and keeps the most recent
//! snapshot in memory. Reads are served from the cache while it is fresh;
//! refreshes are single-flight and shared between request handlers and the
//! background refresher.

pub mod cache;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod freshness;
pub mod provider;
pub mod query;
pub mod refresher;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{CacheEntry, CacheState, WeatherCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::RefreshCoordinator;
pub use error::{FetchCause, FetchError, QueryError};
pub use freshness::is_fresh;
pub use provider::{parse_snapshot, Fetcher, ProviderSettings, WeatherProvider};
pub use query::{CurrentView, WeatherQuery};
pub use refresher::BackgroundRefresher;
pub use types::*;
