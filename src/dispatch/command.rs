use std::fmt;

use crate::location::{Coordinate, CoordinateError};

const SET_LOCATION_PREFIX: &str = "/setlocation";

/// Text command understood by the bot.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Info,
    Status,
    SetLocation(Coordinate),
    Unknown,
}

impl Command {
    /// Classify message text.
    ///
    /// Matching is exact and case-sensitive. Any text starting with
    /// `/setlocation` is treated as a location command and must carry a valid
    /// `(latitude,longitude)` payload.
    pub fn parse(text: &str) -> Result<Command, LocationParseError> {
        match text {
            "/start" => Ok(Command::Start),
            "/help" => Ok(Command::Help),
            "/info" => Ok(Command::Info),
            "/status" => Ok(Command::Status),
            _ => match text.strip_prefix(SET_LOCATION_PREFIX) {
                Some(payload) => parse_coordinate_payload(payload).map(Command::SetLocation),
                None => Ok(Command::Unknown),
            },
        }
    }
}

/// Parse `(<lat>,<lon>)`. Whitespace around each number is allowed.
fn parse_coordinate_payload(payload: &str) -> Result<Coordinate, LocationParseError> {
    let inner = payload
        .strip_prefix('(')
        .and_then(|p| p.strip_suffix(')'))
        .ok_or(LocationParseError::MissingParentheses)?;

    let (lat, lon) = inner
        .split_once(',')
        .ok_or(LocationParseError::MissingSeparator)?;

    let latitude = parse_degrees(lat)?;
    let longitude = parse_degrees(lon)?;

    Coordinate::new(latitude, longitude).map_err(LocationParseError::OutOfRange)
}

fn parse_degrees(raw: &str) -> Result<f64, LocationParseError> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .map_err(|_| LocationParseError::InvalidNumber(raw.to_string()))
}

/// `/setlocation` payload errors
#[derive(Debug, Clone, PartialEq)]
pub enum LocationParseError {
    MissingParentheses,
    MissingSeparator,
    InvalidNumber(String),
    OutOfRange(CoordinateError),
}

impl fmt::Display for LocationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationParseError::MissingParentheses => {
                write!(f, "expected /setlocation(latitude,longitude)")
            }
            LocationParseError::MissingSeparator => {
                write!(f, "latitude and longitude must be separated by a comma")
            }
            LocationParseError::InvalidNumber(s) => write!(f, "'{}' is not a number", s),
            LocationParseError::OutOfRange(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LocationParseError {}
