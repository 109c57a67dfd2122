use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{WeatherError, WeatherProvider, WeatherSnapshot};
use crate::location::Coordinate;

pub const BASE_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Blocks of the One Call response the bot never reads.
const EXCLUDE: &str = "minutely,hourly,daily";

/// One Call API response (only the fields the bot reads).
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub timezone: String,
    pub current: CurrentWeather,
}

/// `current` block of the One Call response.
#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
    pub temp: f64,
    pub humidity: u32,
    pub pressure: u32,
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

impl From<OneCallResponse> for WeatherSnapshot {
    fn from(r: OneCallResponse) -> Self {
        WeatherSnapshot {
            timezone: r.timezone,
            temperature: r.current.temp,
            humidity: r.current.humidity,
            pressure: r.current.pressure,
            wind_speed: r.current.wind_speed,
            description: r.current.weather.into_iter().next().map(|w| w.description),
        }
    }
}

/// HTTP client for the OpenWeather One Call API.
///
/// Requests metric units and excludes the forecast blocks.
pub struct OpenWeatherClient {
    api_key: String,
    http_client: Client,
    base_url: String,
}

impl OpenWeatherClient {
    /// Create a client using the default One Call endpoint.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, BASE_URL.to_string(), timeout)
    }

    /// Create a client with a custom endpoint (for testing with a mock server).
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http_client = Client::builder()
            .user_agent("weatherbot/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Request(e.to_string()))?;
        Ok(Self {
            api_key,
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        debug!(
            lat = coordinate.latitude(),
            lon = coordinate.longitude(),
            "Fetching current weather"
        );

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("lat", coordinate.latitude().to_string()),
                ("lon", coordinate.longitude().to_string()),
                ("appid", self.api_key.clone()),
                ("exclude", EXCLUDE.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WeatherError::Request(e.without_url().to_string()))?;
        let parsed: OneCallResponse =
            serde_json::from_slice(&body).map_err(|e| WeatherError::Decode(e.to_string()))?;

        Ok(parsed.into())
    }
}
