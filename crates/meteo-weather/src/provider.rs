//! Open-Meteo forecast client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::instrument;

use crate::error::{FetchCause, FetchError};
use crate::types::{Location, Snapshot, CURRENT_FIELDS, HOURLY_FIELDS};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com";
const FORECAST_PATH: &str = "/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 512;

/// A source of forecast snapshots.
///
/// Each call performs exactly one upstream request and must finish within a
/// bounded time.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}

/// Settings for [`WeatherProvider`]
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub location: Location,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(location: Location) -> Self {
        Self {
            base_url: OPEN_METEO_URL.to_string(),
            location,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    forecast_url: String,
    location: Location,
}

impl WeatherProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            forecast_url: format!(
                "{}{}",
                settings.base_url.trim_end_matches('/'),
                FORECAST_PATH
            ),
            location: settings.location,
        })
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Fetch the current forecast for the configured location.
    #[instrument(skip(self), fields(lat = self.location.latitude, lon = self.location.longitude), level = "info")]
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", self.location.latitude.to_string()),
                ("longitude", self.location.longitude.to_string()),
                ("current", CURRENT_FIELDS.join(",")),
                ("hourly", HOURLY_FIELDS.join(",")),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            tracing::debug!("Open-Meteo returned status {}", status);
            return Err(FetchCause::UpstreamStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response.bytes().await?;
        parse_snapshot(&body)
    }
}

impl Fetcher for WeatherProvider {
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send {
        self.fetch_snapshot()
    }
}

/// Deserialize and validate a forecast response body.
pub fn parse_snapshot(body: &[u8]) -> Result<Snapshot, FetchError> {
    let snapshot: Snapshot = serde_json::from_slice(body)?;
    snapshot
        .hourly
        .check_aligned()
        .map_err(FetchCause::Inconsistent)?;
    Ok(snapshot)
}
