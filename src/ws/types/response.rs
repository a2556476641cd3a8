use super::FeedMessage;
use crate::error::{Error, Kind};
use crate::ws::WsError;

impl FeedMessage {
    /// Whether this message confirms a subscription, either as a dedicated `subscribed`
    /// message or as a `data` message with `action: "subscribed"`.
    #[must_use]
    pub fn is_subscription_confirmation(&self) -> bool {
        match self.message_type {
            super::MessageType::Subscribed => true,
            super::MessageType::Data => self.action.as_deref() == Some("subscribed"),
            _ => false,
        }
    }
}

/// Validate and deserialize messages from a raw frame.
///
/// Handles both single objects and arrays of messages. Returns an empty vector for empty or
/// whitespace-only input. A frame that does not match the schema (for example an unknown
/// `type` tag or a wrongly typed known field) fails as a whole with a
/// [`Kind::Validation`] error; nothing in it is dispatched.
pub fn parse_messages(bytes: &[u8]) -> crate::Result<Vec<FeedMessage>> {
    // Handle empty or whitespace-only input (server keepalive messages)
    let trimmed = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(&[][..], |start| &bytes[start..]);

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let invalid = |e: serde_json::Error| Error::with_source(Kind::Validation, WsError::MessageParse(e));

    if trimmed.first() == Some(&b'[') {
        serde_json::from_slice(trimmed).map_err(invalid)
    } else {
        let msg: FeedMessage = serde_json::from_slice(trimmed).map_err(invalid)?;
        Ok(vec![msg])
    }
}
