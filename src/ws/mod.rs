//! Live feed over WebSocket.
//!
//! # Architecture
//!
//! - [`ConnectionManager`]: socket lifecycle, heartbeat, backoff reconnection and topic
//!   subscriptions
//! - [`subscription::TopicSet`]: the subscribed topics and the reconciliation planner behind
//!   [`ConnectionManager::set_topics`]
//! - [`dispatch::Dispatcher`]: built-in protocol handling plus one user handler per message type
//! - [`types`]: the wire format and its validation
//!
//! # Protocol
//!
//! Every frame is a JSON object (or an array of them) tagged by `type`. The client sends
//! `subscribe`/`unsubscribe` with a `feed_category`, pings every heartbeat interval and answers
//! every `ping` with a `pong` echoing its `timestamp`.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod subscription;
pub mod types;

pub use connection::{ConnectionEvent, ConnectionManager, ConnectionState};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
