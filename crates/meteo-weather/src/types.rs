use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Fields requested for the `current` section
pub const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "wind_speed_10m",
    "relative_humidity_2m",
    "precipitation",
    "precipitation_probability",
    "weather_code",
    "wind_direction_10m",
    "apparent_temperature",
    "cloud_cover",
];

/// Fields requested for the `hourly` section
pub const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "wind_speed_10m",
    "relative_humidity_2m",
    "precipitation",
    "precipitation_probability",
    "weather_code",
];

/// Current observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: String,
    pub interval: u32,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: u8,
    pub precipitation: f64,
    pub precipitation_probability: u8,
    pub weather_code: u8,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: u16,
    pub apparent_temperature: f64,
    pub cloud_cover: u8,
}

impl CurrentConditions {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }
}

/// Unit labels for [`CurrentConditions`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUnits {
    pub time: String,
    pub interval: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: String,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: String,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: String,
    pub precipitation: String,
    pub precipitation_probability: String,
    pub weather_code: String,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: String,
    pub apparent_temperature: String,
    pub cloud_cover: String,
}

/// Hourly forecast series. Every series is index-aligned with `time`;
/// the provider reports missing values as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Vec<Option<f64>>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Vec<Option<f64>>,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: Vec<Option<u8>>,
    pub precipitation: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<u8>>,
    pub weather_code: Vec<Option<u8>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Check that every series has one value per timestamp.
    pub fn check_aligned(&self) -> Result<(), String> {
        let expected = self.time.len();
        let series = [
            ("temperature_2m", self.temperature.len()),
            ("wind_speed_10m", self.wind_speed.len()),
            ("relative_humidity_2m", self.humidity.len()),
            ("precipitation", self.precipitation.len()),
            ("precipitation_probability", self.precipitation_probability.len()),
            ("weather_code", self.weather_code.len()),
        ];

        for (name, len) in series {
            if len != expected {
                return Err(format!(
                    "hourly.{} has {} values for {} timestamps",
                    name, len, expected
                ));
            }
        }
        Ok(())
    }
}

/// Unit labels for [`HourlySeries`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyUnits {
    pub time: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: String,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: String,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: String,
    pub precipitation: String,
    pub precipitation_probability: String,
    pub weather_code: String,
}

/// One complete forecast document, as returned by a single successful fetch.
///
/// Shared as `Arc<Snapshot>` once fetched and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current: CurrentConditions,
    pub current_units: CurrentUnits,
    pub hourly: HourlySeries,
    pub hourly_units: HourlyUnits,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_wmo_code_clear() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
    }

    #[test]
    fn test_wmo_code_partly_cloudy() {
        assert_eq!(WeatherCondition::from_wmo_code(1), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_wmo_code(2), WeatherCondition::PartlyCloudy);
    }

    #[test]
    fn test_wmo_code_precipitation() {
        assert_eq!(WeatherCondition::from_wmo_code(53), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::from_wmo_code(61), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_wmo_code(82), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_wmo_code(66), WeatherCondition::Sleet);
        assert_eq!(WeatherCondition::from_wmo_code(75), WeatherCondition::Snow);
    }

    #[test]
    fn test_wmo_code_thunderstorm() {
        assert_eq!(WeatherCondition::from_wmo_code(95), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_wmo_code(99), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_wmo_code_unknown_defaults_to_clear() {
        assert_eq!(WeatherCondition::from_wmo_code(200), WeatherCondition::Clear);
    }

    #[test]
    fn test_condition_description() {
        assert_eq!(WeatherCondition::Clear.description(), "Clear");
        assert_eq!(WeatherCondition::HeavyRain.description(), "Heavy Rain");
    }

    #[test]
    fn test_snapshot_keeps_upstream_field_names() {
        let snapshot = test_support::snapshot(18.0);
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["current"]["temperature_2m"], 18.0);
        assert_eq!(value["current_units"]["wind_direction_10m"], "°");
        assert!(value["hourly"]["precipitation_probability"].is_array());
        assert!(value["current"].get("temperature").is_none());
    }

    #[test]
    fn test_hourly_alignment() {
        let mut snapshot = test_support::snapshot(18.0);
        assert!(snapshot.hourly.check_aligned().is_ok());

        snapshot.hourly.weather_code.pop();
        let err = snapshot.hourly.check_aligned().unwrap_err();
        assert!(err.contains("weather_code"));
    }

    #[test]
    fn test_current_condition_from_code() {
        let mut snapshot = test_support::snapshot(18.0);
        snapshot.current.weather_code = 3;
        assert_eq!(snapshot.current.condition(), WeatherCondition::Cloudy);
    }
}
