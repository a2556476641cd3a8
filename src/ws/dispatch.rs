//! Routing of validated inbound messages to built-in handling and user callbacks.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use super::types::{FeedMessage, MessageType};

/// Callback invoked with every inbound message of the type it was registered for.
pub type MessageHandler = Arc<dyn Fn(&FeedMessage) + Send + Sync + 'static>;

/// Per-instance handler table plus the protocol's built-in reactions.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<MessageType, MessageHandler>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut registered: Vec<String> = handlers.keys().map(ToString::to_string).collect();
        registered.sort();
        f.debug_struct("Dispatcher")
            .field("handlers", &registered)
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `message_type`, replacing any handler registered before.
    ///
    /// There is exactly one handler per type (last write wins). The replacement applies to
    /// messages dispatched after this call returns.
    pub fn set_handler(&self, message_type: MessageType, handler: MessageHandler) {
        // The map has no intermediate state a panic could leave half-written.
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(message_type, handler);
    }

    /// Remove the handler for `message_type`, returning it if one was registered.
    pub fn remove_handler(&self, message_type: MessageType) -> Option<MessageHandler> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&message_type)
    }

    #[must_use]
    pub fn has_handler(&self, message_type: MessageType) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&message_type)
    }

    /// Handle one message: built-in handling first, then the registered handler, if any.
    ///
    /// Returns the automatic reply the connection must send. Only `ping` produces one: a
    /// `pong` echoing the ping's timestamp.
    pub fn dispatch(&self, message: &FeedMessage) -> Option<FeedMessage> {
        let reply = Self::builtin(message);
        self.notify(message);
        reply
    }

    fn builtin(message: &FeedMessage) -> Option<FeedMessage> {
        match message.message_type {
            MessageType::Ping => return Some(FeedMessage::pong(message.timestamp)),
            MessageType::Connected => {
                #[cfg(feature = "tracing")]
                tracing::info!("Connected to feed WebSocket");
            }
            MessageType::Error => {
                #[cfg(feature = "tracing")]
                tracing::error!(
                    error = message.error.as_deref().unwrap_or_default(),
                    details = message.details.as_deref().unwrap_or_default(),
                    "Feed error"
                );
            }
            _ if message.is_subscription_confirmation() => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    feed_category = message.feed_category.as_deref().unwrap_or_default(),
                    "Successfully subscribed"
                );
            }
            _ => {}
        }

        None
    }

    fn notify(&self, message: &FeedMessage) {
        // Clone out of the lock so a handler may re-register handlers without deadlocking.
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&message.message_type)
            .cloned();

        let Some(handler) = handler else {
            return;
        };

        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(message))) {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            #[cfg(feature = "tracing")]
            tracing::error!(
                message_type = %message.message_type,
                %reason,
                "Message handler panicked"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = &reason;
        }
    }
}
