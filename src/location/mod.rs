use dashmap::DashMap;
use std::fmt;

use crate::event::UserId;


/// Geographic coordinate in decimal degrees.
///
/// Only constructed through [`Coordinate::new`], so latitude is always within
/// [-90, 90] and longitude within [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Renders as `(lat, lon)` with six decimals, e.g. `(12.345000, 67.890000)`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Coordinate construction errors
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateError::LatitudeOutOfRange(v) => {
                write!(f, "latitude must be within [-90, 90], got {}", v)
            }
            CoordinateError::LongitudeOutOfRange(v) => {
                write!(f, "longitude must be within [-180, 180], got {}", v)
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

/// Default location per user.
///
/// Last write wins. Users that never set a location have no entry, which is
/// distinct from a stored `(0, 0)`. State is in-memory only (resets on restart).
pub struct LocationStore {
    locations: DashMap<UserId, Coordinate>,
}

impl LocationStore {
    pub fn new() -> Self {
        Self {
            locations: DashMap::new(),
        }
    }

    /// Stored location for `user`, or `None` if it was never set.
    pub fn get(&self, user: UserId) -> Option<Coordinate> {
        self.locations.get(&user).map(|c| *c)
    }

    /// Store `coordinate` as the default location for `user`, replacing any previous one.
    pub fn set(&self, user: UserId, coordinate: Coordinate) {
        self.locations.insert(user, coordinate);
    }

    /// Number of users with a stored location
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}
