//! Wire types for the feed WebSocket.

pub mod request;
pub mod response;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of `type` tags the feed protocol defines.
#[non_exhaustive]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageType {
    /// Client request to start receiving a feed category
    Subscribe,
    /// Client request to stop receiving a feed category
    Unsubscribe,
    /// Liveness probe, sent by either side
    Ping,
    /// Answer to a [`MessageType::Ping`], echoing its timestamp
    Pong,
    /// A feed event
    Data,
    /// Server-side error report
    Error,
    /// Server confirmation that the connection was accepted
    Connected,
    /// Server confirmation of a subscription
    Subscribed,
}

/// A single message on the feed WebSocket, in either direction.
///
/// Known fields are typed; anything else the server sends is kept in [`FeedMessage::extra`]
/// so newer payloads keep deserializing.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct FeedMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub feed_category: Option<String>,
    /// Event payload for [`MessageType::Data`] messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Sub-action of a message, e.g. `subscribed` on a `data` confirmation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub details: Option<String>,
    /// Unix timestamp in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Attributes outside the known schema
    #[serde(flatten)]
    #[builder(default)]
    pub extra: Map<String, Value>,
}
