use crate::location::Coordinate;
use crate::weather::WeatherSnapshot;

pub const GREETING: &str = "Hello! Welcome to the bot";

pub const HELP: &str = "This is a bot that can help you with weather information.
Attach your location to get the weather there.

You can also set a default location with /setlocation(latitude,longitude)
eg: /setlocation(12.345,67.890)

Commands:
/start - Greet the bot
/help - Get help
/info - Get weather information of your default location
/status - Show bot status and your default location
/setlocation(latitude,longitude) - Set your default location

You can also send your location as an attachment (paperclip icon -> Location).";

pub const DONT_KNOW: &str = "I don't know what to say 🤷‍♂️";

pub const WEATHER_ERROR: &str = "Error getting weather data";

pub const INVALID_LOCATION: &str =
    "Invalid location format. Use /setlocation(latitude,longitude), eg: /setlocation(12.345,67.890)";

pub const NO_DEFAULT_LOCATION: &str =
    "Default location is not set. Use /setlocation(latitude,longitude) to set it.";

pub fn rate_limited(limit_per_minute: u32) -> String {
    format!(
        "Rate limit exceeded ({} requests per minute). Please wait.",
        limit_per_minute
    )
}

pub fn status(location: Option<Coordinate>) -> String {
    match location {
        Some(c) => format!("Bot is running.\nDefault location is set to {}", c),
        None => "Bot is running.\nDefault location is not set.".to_string(),
    }
}

pub fn location_set(location: Coordinate) -> String {
    format!("Default location set to {}", location)
}

/// Where the reported coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeatherSource {
    /// Location attached to the message
    Current,
    /// Location stored with /setlocation
    Default,
}

pub fn weather(source: WeatherSource, location: Coordinate, snapshot: &WeatherSnapshot) -> String {
    let heading = match source {
        WeatherSource::Current => "Weather in your current location:",
        WeatherSource::Default => "Weather in your default location:",
    };

    let mut text = format!(
        "{}\n(Latitude: {:.6}, Longitude: {:.6})\nTimezone: {}\nTemperature: {:.2}°C\n{}% humidity\n{} hPa pressure\n{:.2} m/s wind speed",
        heading,
        location.latitude(),
        location.longitude(),
        snapshot.timezone,
        snapshot.temperature,
        snapshot.humidity,
        snapshot.pressure,
        snapshot.wind_speed,
    );
    if let Some(description) = &snapshot.description {
        text.push_str("\nConditions: ");
        text.push_str(description);
    }
    text
}
