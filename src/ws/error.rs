#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;

/// WebSocket error variants.
#[non_exhaustive]
#[derive(Debug)]
pub enum WsError {
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// Error parsing a WebSocket message
    MessageParse(serde_json::Error),
    /// Subscription change attempted while the connection is not open
    NotConnected,
    /// WebSocket connection was closed
    ConnectionClosed,
    /// The configured number of reconnection attempts was used up
    ReconnectExhausted {
        /// Number of attempts that were made
        attempts: u32,
    },
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::MessageParse(e) => write!(f, "Failed to parse WebSocket message: {e}"),
            Self::NotConnected => write!(f, "WebSocket is not connected. Call connect() first"),
            Self::ConnectionClosed => write!(f, "WebSocket connection closed"),
            Self::ReconnectExhausted { attempts } => {
                write!(f, "Max reconnection attempts reached ({attempts})")
            }
        }
    }
}

impl StdError for WsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            Self::MessageParse(e) => Some(e),
            _ => None,
        }
    }
}

// Integration with main Error type
impl From<WsError> for crate::error::Error {
    fn from(e: WsError) -> Self {
        let kind = match e {
            WsError::NotConnected => crate::error::Kind::NotConnected,
            _ => crate::error::Kind::WebSocket,
        };
        crate::error::Error::with_source(kind, e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for crate::error::Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, WsError::Connection(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Kind};

    #[test]
    fn not_connected_maps_to_its_own_kind() {
        let error: Error = WsError::NotConnected.into();
        assert_eq!(error.kind(), Kind::NotConnected);
        assert!(matches!(
            error.downcast_ref::<WsError>(),
            Some(WsError::NotConnected)
        ));
    }

    #[test]
    fn other_variants_map_to_websocket_kind() {
        let error: Error = WsError::ConnectionClosed.into();
        assert_eq!(error.kind(), Kind::WebSocket);

        let error: Error = WsError::ReconnectExhausted { attempts: 5 }.into();
        assert_eq!(error.kind(), Kind::WebSocket);
        assert!(error.to_string().contains("(5)"));
    }
}
