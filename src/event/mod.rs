use std::fmt;

use crate::location::Coordinate;

/// Chat participant identity, as supplied by the chat platform.
///
/// For Telegram this is the chat id the reply is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound chat event. Consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user: UserId,
    /// Message text, if the message carried any
    pub text: Option<String>,
    /// Location shared as an attachment
    pub location: Option<Coordinate>,
}

impl InboundEvent {
    /// Plain text message.
    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            text: Some(text.into()),
            location: None,
        }
    }

    /// Location attachment without text.
    pub fn location(user: UserId, location: Coordinate) -> Self {
        Self {
            user,
            text: None,
            location: Some(location),
        }
    }
}

/// Reply produced for exactly one [`InboundEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundReply {
    pub user: UserId,
    pub text: String,
}

impl OutboundReply {
    pub fn new(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            text: text.into(),
        }
    }
}
