use serde::Deserialize;

use super::ConfigError;

/// Non-secret settings. Every section and field has a default, so an empty
/// (or absent) settings file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Telegram Bot API settings
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Long-poll timeout for getUpdates (seconds)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
    /// Timeout for every other Bot API call (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Pause after a failed getUpdates before polling again (seconds)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
}

fn default_telegram_api_url() -> String {
    crate::telegram::client::BASE_URL.to_string()
}

fn default_poll_timeout() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    10
}

fn default_retry_delay() -> u64 {
    5
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            poll_timeout_seconds: default_poll_timeout(),
            request_timeout_seconds: default_request_timeout(),
            retry_delay_seconds: default_retry_delay(),
        }
    }
}

/// Weather provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,
    /// Upper bound on one weather lookup (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_weather_api_url() -> String {
    crate::weather::client::BASE_URL.to_string()
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_url: default_weather_api_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Per-user rate limit settings
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,
}

fn default_max_requests_per_minute() -> u32 {
    10
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests_per_minute: default_max_requests_per_minute(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply `WEATHERBOT_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(n) = parse_env_var("WEATHERBOT_RATE_LIMIT_PER_MINUTE")? {
            self.rate_limit.max_requests_per_minute = n;
        }
        if let Some(n) = parse_env_var("WEATHERBOT_WEATHER_TIMEOUT_SECONDS")? {
            self.weather.request_timeout_seconds = n;
        }
        if let Some(n) = parse_env_var("WEATHERBOT_POLL_TIMEOUT_SECONDS")? {
            self.telegram.poll_timeout_seconds = n;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                name: "rate_limit.max_requests_per_minute",
                value: "0".to_string(),
            });
        }
        if self.weather.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "weather.request_timeout_seconds",
                value: "0".to_string(),
            });
        }
        if self.telegram.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "telegram.request_timeout_seconds",
                value: "0".to_string(),
            });
        }
        if self.telegram.retry_delay_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "telegram.retry_delay_seconds",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(v) => {
            let parsed = v.trim().parse::<T>();
            match parsed {
                Ok(n) => Ok(Some(n)),
                Err(_) => Err(ConfigError::InvalidValue { name, value: v }),
            }
        }
        Err(_) => Ok(None),
    }
}
