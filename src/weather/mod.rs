//! Weather provider seam.
//!
//! The dispatcher only depends on [`WeatherProvider`]; [`OpenWeatherClient`]
//! is the production implementation backed by the OpenWeather One Call API.

pub mod client;

use async_trait::async_trait;
use std::fmt;

use crate::location::Coordinate;

pub use client::OpenWeatherClient;

/// Current conditions at a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// IANA timezone name reported by the provider (e.g. "Asia/Kolkata")
    pub timezone: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Percent
    pub humidity: u32,
    /// hPa
    pub pressure: u32,
    /// m/s
    pub wind_speed: f64,
    /// First condition description, if the provider sent one (e.g. "light rain")
    pub description: Option<String>,
}

/// Source of current weather data.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current weather at `coordinate`.
    ///
    /// No retries. Every failure is reported as a [`WeatherError`]; callers
    /// treat all variants the same way.
    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError>;
}

/// Weather provider errors
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// Request could not be sent or timed out
    Request(String),
    /// Provider answered with a non-2xx status
    Status(u16),
    /// Response body was not the expected JSON
    Decode(String),
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherError::Request(e) => write!(f, "weather request failed: {}", e),
            WeatherError::Status(code) => {
                write!(f, "weather API request failed with status {}", code)
            }
            WeatherError::Decode(e) => write!(f, "failed to parse weather response: {}", e),
        }
    }
}

impl std::error::Error for WeatherError {}
