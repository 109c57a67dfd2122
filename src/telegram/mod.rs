//! Chat transport seam and its Telegram Bot API implementation.

pub mod client;
pub mod types;

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, warn};

use crate::event::{InboundEvent, OutboundReply, UserId};
use crate::location::Coordinate;

pub use client::TelegramClient;
use types::Update;

/// Source of inbound events and sink for replies.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Next batch of inbound events, in arrival order.
    ///
    /// An empty batch is normal (e.g. a long poll that timed out).
    async fn receive(&self) -> Result<Vec<InboundEvent>, TransportError>;

    /// Deliver one reply.
    async fn send(&self, reply: &OutboundReply) -> Result<(), TransportError>;
}

/// Chat transport errors
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Request could not be sent or timed out
    Request(String),
    /// Platform rejected the call
    Api {
        code: Option<i64>,
        description: String,
    },
    /// Response body was not the expected JSON
    Decode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(e) => write!(f, "transport request failed: {}", e),
            TransportError::Api {
                code: Some(code),
                description,
            } => write!(f, "chat API error {}: {}", code, description),
            TransportError::Api {
                code: None,
                description,
            } => write!(f, "chat API error: {}", description),
            TransportError::Decode(e) => write!(f, "failed to parse chat API response: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

/// Long-polling Telegram transport.
///
/// Tracks the update offset so every update is delivered once per process.
pub struct TelegramTransport {
    client: TelegramClient,
    poll_timeout_secs: u64,
    offset: AtomicI64,
}

impl TelegramTransport {
    pub fn new(client: TelegramClient, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            poll_timeout_secs,
            offset: AtomicI64::new(0),
        }
    }

    /// Offset the next `getUpdates` call will use
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn receive(&self) -> Result<Vec<InboundEvent>, TransportError> {
        let updates = self
            .client
            .get_updates(self.offset(), self.poll_timeout_secs)
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.fetch_max(last + 1, Ordering::SeqCst);
        }

        debug!(count = updates.len(), "Received updates");
        Ok(updates.into_iter().filter_map(to_inbound_event).collect())
    }

    async fn send(&self, reply: &OutboundReply) -> Result<(), TransportError> {
        self.client.send_message(reply.user.0, &reply.text).await?;
        Ok(())
    }
}

/// Map an update to an inbound event. Updates without a message are skipped.
pub fn to_inbound_event(update: Update) -> Option<InboundEvent> {
    let message = update.message?;
    let user = UserId(message.chat.id);

    let location = message.location.and_then(|l| {
        match Coordinate::new(l.latitude, l.longitude) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(user_id = %user, error = %e, "Dropping invalid attached location");
                None
            }
        }
    });

    Some(InboundEvent {
        user,
        text: message.text,
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::types::{Chat, Location, Message};

    fn update(id: i64, text: Option<&str>, location: Option<(f64, f64)>) -> Update {
        Update {
            update_id: id,
            message: Some(Message {
                message_id: id,
                chat: Chat { id: 77 },
                from: None,
                text: text.map(str::to_string),
                location: location.map(|(latitude, longitude)| Location {
                    latitude,
                    longitude,
                }),
            }),
        }
    }

    #[test]
    fn test_text_update() {
        let event = to_inbound_event(update(1, Some("/help"), None)).unwrap();
        assert_eq!(event, InboundEvent::text(UserId(77), "/help"));
    }

    #[test]
    fn test_location_update() {
        let event = to_inbound_event(update(1, None, Some((10.5, -20.25)))).unwrap();
        assert_eq!(event.user, UserId(77));
        assert_eq!(event.location, Some(Coordinate::new(10.5, -20.25).unwrap()));
        assert_eq!(event.text, None);
    }

    #[test]
    fn test_update_without_message_skipped() {
        let u = Update {
            update_id: 3,
            message: None,
        };
        assert!(to_inbound_event(u).is_none());
    }

    #[test]
    fn test_invalid_location_dropped() {
        let event = to_inbound_event(update(1, Some("hi"), Some((120.0, 0.0)))).unwrap();
        assert_eq!(event.location, None);
        assert_eq!(event.text.as_deref(), Some("hi"));
    }

    #[test]
    fn test_error_display() {
        let e = TransportError::Api {
            code: Some(429),
            description: "Too Many Requests".to_string(),
        };
        assert_eq!(e.to_string(), "chat API error 429: Too Many Requests");
    }
}
