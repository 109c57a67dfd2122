//! Per-user rate-limited command dispatcher.
//!
//! Every inbound event produces exactly one reply. Per-event failures
//! (throttling, bad `/setlocation` payloads, weather provider errors) are
//! turned into reply text here and never reach the consume loop.

pub mod command;
pub mod messages;


use std::sync::Arc;
use tracing::{info, warn};

use crate::event::{InboundEvent, OutboundReply, UserId};
use crate::location::{Coordinate, LocationStore};
use crate::rate_limit::RateLimiter;
use crate::weather::WeatherProvider;

pub use command::{Command, LocationParseError};
use messages::WeatherSource;

/// Turns inbound events into replies.
///
/// Holds shared handles only, so one instance can serve concurrent callers.
pub struct Dispatcher {
    rate_limiter: Arc<RateLimiter>,
    locations: Arc<LocationStore>,
    weather: Arc<dyn WeatherProvider>,
}

impl Dispatcher {
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        locations: Arc<LocationStore>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            rate_limiter,
            locations,
            weather,
        }
    }

    /// Handle one event and build its reply.
    ///
    /// Order: rate limit, then attached location, then text command.
    pub async fn dispatch(&self, event: &InboundEvent) -> OutboundReply {
        let user = event.user;
        info!(
            user_id = %user,
            text = event.text.as_deref().unwrap_or(""),
            has_location = event.location.is_some(),
            "Inbound event"
        );

        if !self.rate_limiter.allow(user) {
            warn!(
                user_id = %user,
                limit_per_minute = self.rate_limiter.limit_per_minute(),
                tracked_users = self.rate_limiter.tracked_users(),
                "Rate limit exceeded"
            );
            return OutboundReply::new(
                user,
                messages::rate_limited(self.rate_limiter.limit_per_minute()),
            );
        }

        // Attached locations are used once and never stored
        if let Some(location) = event.location {
            let text = self.weather_reply(user, WeatherSource::Current, location).await;
            return OutboundReply::new(user, text);
        }

        let text = event.text.as_deref().unwrap_or("");
        let reply = match Command::parse(text) {
            Ok(command) => self.execute(user, command).await,
            Err(e) => {
                warn!(user_id = %user, error = %e, "Invalid /setlocation payload");
                messages::INVALID_LOCATION.to_string()
            }
        };

        OutboundReply::new(user, reply)
    }

    async fn execute(&self, user: UserId, command: Command) -> String {
        match command {
            Command::Start => messages::GREETING.to_string(),
            Command::Help => messages::HELP.to_string(),
            Command::Info => match self.locations.get(user) {
                Some(location) => {
                    self.weather_reply(user, WeatherSource::Default, location)
                        .await
                }
                None => messages::NO_DEFAULT_LOCATION.to_string(),
            },
            Command::Status => messages::status(self.locations.get(user)),
            Command::SetLocation(location) => {
                self.locations.set(user, location);
                info!(
                    user_id = %user,
                    location = %location,
                    stored_locations = self.locations.len(),
                    "Default location set"
                );
                messages::location_set(location)
            }
            Command::Unknown => messages::DONT_KNOW.to_string(),
        }
    }

    async fn weather_reply(
        &self,
        user: UserId,
        source: WeatherSource,
        location: Coordinate,
    ) -> String {
        match self.weather.fetch(location).await {
            Ok(snapshot) => messages::weather(source, location, &snapshot),
            Err(e) => {
                warn!(user_id = %user, location = %location, error = %e, "Weather lookup failed");
                messages::WEATHER_ERROR.to_string()
            }
        }
    }
}
