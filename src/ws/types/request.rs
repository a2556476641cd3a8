use serde_json::Map;

use super::{FeedMessage, MessageType};

impl FeedMessage {
    fn control(message_type: MessageType) -> Self {
        Self {
            message_type,
            feed_category: None,
            content: None,
            action: None,
            error: None,
            details: None,
            timestamp: None,
            extra: Map::new(),
        }
    }

    /// Create a subscribe request for a feed category.
    #[must_use]
    pub fn subscribe(feed_category: &str) -> Self {
        Self {
            feed_category: Some(feed_category.to_owned()),
            ..Self::control(MessageType::Subscribe)
        }
    }

    /// Create an unsubscribe request for a feed category.
    #[must_use]
    pub fn unsubscribe(feed_category: &str) -> Self {
        Self {
            feed_category: Some(feed_category.to_owned()),
            ..Self::control(MessageType::Unsubscribe)
        }
    }

    /// Create a heartbeat ping carrying the given time in milliseconds.
    #[must_use]
    pub fn ping(timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::control(MessageType::Ping)
        }
    }

    /// Create a pong echoing the timestamp of the ping it answers.
    #[must_use]
    pub fn pong(timestamp: Option<i64>) -> Self {
        Self {
            timestamp,
            ..Self::control(MessageType::Pong)
        }
    }
}
