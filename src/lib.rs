// Inbound events and replies
pub mod event;

// Per-user token bucket
pub mod rate_limit;

// Coordinates and per-user default locations
pub mod location;

// Command grammar and dispatcher
pub mod dispatch;

// Weather provider (OpenWeather One Call)
pub mod weather;

// Chat transport (Telegram Bot API)
pub mod telegram;

// Consume loop
pub mod bot;

// Startup configuration
pub mod config;

pub use bot::Bot;
pub use dispatch::Dispatcher;
pub use event::{InboundEvent, OutboundReply, UserId};
pub use location::{Coordinate, LocationStore};
pub use rate_limit::RateLimiter;
