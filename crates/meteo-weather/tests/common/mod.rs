//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use meteo_weather::{Location, ProviderSettings, WeatherProvider};
use wiremock::MockServer;

pub const MASERU: Location = Location {
    latitude: -29.3167,
    longitude: 27.4833,
};

/// The recorded Open-Meteo response, with its current temperature replaced.
pub fn forecast_body(temperature: f64) -> serde_json::Value {
    let mut body: serde_json::Value =
        serde_json::from_str(include_str!("../fixtures/forecast.json")).unwrap();
    body["current"]["temperature_2m"] = serde_json::json!(temperature);
    body["current"]["apparent_temperature"] = serde_json::json!(temperature - 1.5);
    body
}

pub fn provider_for(server: &MockServer) -> WeatherProvider {
    provider_with_timeout(server, Duration::from_secs(5))
}

pub fn provider_with_timeout(server: &MockServer, timeout: Duration) -> WeatherProvider {
    let settings = ProviderSettings::new(MASERU)
        .with_base_url(server.uri())
        .with_timeout(timeout);
    WeatherProvider::new(settings).unwrap()
}
