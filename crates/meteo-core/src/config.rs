use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Cache and refresh timing
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP API binds to, e.g. 0.0.0.0:9000
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "0.0.0.0:9000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerConfig {
    /// Parse the listen address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server.listen: {}", e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast location latitude (static, never derived from requests)
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Forecast location longitude
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Open-Meteo base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upstream request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_latitude() -> f64 {
    -29.3167
}

fn default_longitude() -> f64 {
    27.4833
}

fn default_base_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl WeatherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched snapshot may be served without refetching (seconds)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Background refresh period (seconds)
    #[serde(default = "default_refresh")]
    pub refresh_secs: u64,

    /// Serve the last good snapshot when a refresh fails
    #[serde(default = "default_serve_stale")]
    pub serve_stale: bool,
}

fn default_ttl() -> u64 {
    300
}

fn default_refresh() -> u64 {
    300
}

fn default_serve_stale() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            refresh_secs: default_refresh(),
            serve_stale: default_serve_stale(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// and a default file is written there if it doesn't exist yet.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()).into());
                }
                Self::load_from_path(path)
            }
            None => {
                let config_path = Self::config_path()?;

                if !config_path.exists() {
                    let config = Self::default();
                    config.save_to(&config_path)?;
                    tracing::info!("Wrote default config to {}", config_path.display());
                    return Ok(config);
                }

                Self::load_from_path(&config_path)
            }
        }
    }

    /// Load a config file from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(explicit_path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = Self::load(explicit_path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Err(e) = self.server.listen_addr() {
            result.add_error("server.listen", e.to_string());
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if !(-90.0..=90.0).contains(&self.weather.latitude) {
            result.add_error("weather.latitude", "Latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.weather.longitude) {
            result.add_error("weather.longitude", "Longitude must be between -180 and 180");
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.weather.request_timeout_secs >= self.cache.refresh_secs {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is not shorter than the refresh period",
            );
        }

        if self.cache.ttl_secs == 0 {
            result.add_error("cache.ttl_secs", "TTL must be greater than 0");
        }

        if self.cache.refresh_secs == 0 {
            result.add_error("cache.refresh_secs", "Refresh period must be greater than 0");
        } else if self.cache.refresh_secs > 86_400 {
            result.add_warning(
                "cache.refresh_secs",
                "Refresh period is more than 24 hours",
            );
        }

        if self.cache.refresh_secs > self.cache.ttl_secs && self.cache.ttl_secs > 0 {
            result.add_warning(
                "cache.refresh_secs",
                "Refresh period is longer than the TTL; requests will trigger refetches",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the default configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("meteo");

        Ok(config_dir.join("config.toml"))
    }
}
