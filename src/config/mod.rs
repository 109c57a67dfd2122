pub mod settings;
pub use settings::{RateLimitSettings, Settings, TelegramSettings, WeatherSettings};

use std::fmt;

pub const TELEGRAM_BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const OPENWEATHER_API_KEY_VAR: &str = "OPENWEATHER_API_KEY";
/// Optional path to a TOML settings file
pub const CONFIG_PATH_VAR: &str = "WEATHERBOT_CONFIG";

/// Credentials for the two upstream APIs. Never printed.
#[derive(Clone)]
pub struct Secrets {
    pub telegram_bot_token: String,
    pub weather_api_key: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &"<redacted>")
            .field("weather_api_key", &"<redacted>")
            .finish()
    }
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub secrets: Secrets,
    pub settings: Settings,
}

impl Config {
    /// Load configuration at startup.
    ///
    /// Reads `.env` if present, then [`Config::from_env`].
    pub fn load() -> Result<Self, ConfigError> {
        check_dotenv(dotenv::dotenv())?;
        Self::from_env()
    }

    /// Build from environment variables.
    ///
    /// Secrets are required. Settings come from the TOML file named by
    /// `WEATHERBOT_CONFIG` (defaults otherwise) with `WEATHERBOT_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secrets = Secrets {
            telegram_bot_token: required_var(TELEGRAM_BOT_TOKEN_VAR)?,
            weather_api_key: required_var(OPENWEATHER_API_KEY_VAR)?,
        };

        let mut settings = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Settings::from_file(&path)?,
            Err(_) => Settings::default(),
        };
        settings.apply_env_overrides()?;
        settings.validate()?;

        Ok(Self { secrets, settings })
    }
}

/// A missing `.env` is fine; secrets may come from the real environment.
/// Any other failure to read it is fatal.
fn check_dotenv<T>(result: Result<T, dotenv::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e.to_string())),
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Required environment variable is unset or empty
    MissingVar(&'static str),
    /// Value present but unusable
    InvalidValue { name: &'static str, value: String },
    /// Settings file could not be read or parsed
    File { path: String, reason: String },
    /// `.env` exists but could not be read or parsed
    DotEnv(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(name) => write!(f, "{} is required but not set", name),
            ConfigError::InvalidValue { name, value } => {
                write!(f, "invalid value for {}: '{}'", name, value)
            }
            ConfigError::File { path, reason } => {
                write!(f, "failed to load settings file {}: {}", path, reason)
            }
            ConfigError::DotEnv(reason) => write!(f, "failed to load .env: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}
