//! Centralized error types for the Meteo service.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides client-safe messages for HTTP responses
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level service error type.
///
/// Errors surfaced to HTTP clients are converted to this type first.
/// Use `user_message()` to get a client-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),
}

impl AppError {
    /// Returns a client-safe message without internal details.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Unable to reach the weather provider.",
            NetworkError::Timeout => "The weather provider did not respond in time.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather provider is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The weather provider rejected the request.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response from the weather provider."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

/// Weather service errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Nothing has been fetched successfully since startup.
    #[error("Weather data not yet available: {0}")]
    NotYetAvailable(String),

    /// A refresh failed and stale data may not be served.
    #[error("Weather refresh failed: {0}")]
    RefreshFailed(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::NotYetAvailable(_) => {
                "Weather data is not available yet. Please try again shortly."
            }
            WeatherError::RefreshFailed(_) => "Weather data could not be refreshed.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for &reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() || self.is_body() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
