#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use backoff::backoff::Backoff as _;
use futures::stream::SplitSink;
use futures::{SinkExt as _, StreamExt as _};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use super::config::{Config, ReconnectBackoff};
use super::dispatch::{Dispatcher, MessageHandler};
use super::error::WsError;
use super::subscription::TopicSet;
use super::types::response::parse_messages;
use super::types::{FeedMessage, MessageType};
use crate::Result;
use crate::config::validate_topics;
use crate::error::Error;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, Message>;

/// Broadcast channel capacity for connection events.
const EVENT_CAPACITY: usize = 64;

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Connected; subscriptions may be changed
    Open,
    /// Caller-initiated close in progress
    Closing,
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Lifecycle notifications published by the [`ConnectionManager`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The socket opened and the reconnect counter was reset
    Opened,
    /// The socket closed. `intentional` is set when the close came from
    /// [`ConnectionManager::disconnect`].
    Closed { intentional: bool },
    /// A reconnect attempt will run after `delay`
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// No further reconnect attempts will be made until the next explicit connect
    ReconnectExhausted { attempts: u32 },
}

/// Who asked for a connection attempt.
enum Origin {
    Caller,
    /// A reconnect timer belonging to the session the token identifies
    Reconnect(CancellationToken),
}

/// Why a connection task stopped.
#[derive(Debug)]
#[cfg_attr(
    not(feature = "tracing"),
    expect(dead_code, reason = "Close details are only read when logging")
)]
enum Closure {
    Intentional,
    Remote(Option<CloseFrame>),
    Failed(Error),
}

/// Bookkeeping shared between caller operations and connection tasks.
///
/// Every field is read and written under one lock, so state, socket slot and subscribed
/// topics always change together.
struct Shared {
    state: ConnectionState,
    /// Outbound queue of the live socket; `Some` only while a connection task runs
    socket: Option<mpsc::UnboundedSender<String>>,
    /// Identifies the connection that currently owns `socket`
    generation: u64,
    subscribed: TopicSet,
    /// Configured topics, replayed on every auto-subscribing open
    topics: Vec<String>,
    backoff: ReconnectBackoff,
    /// Cancelled by `disconnect()`; stops the connection task, pending timers and connects
    session: CancellationToken,
    /// Only aborted when the manager is dropped, while the timer holds nothing but a weak
    /// reference
    reconnect_timer: Option<AbortHandle>,
}

impl Shared {
    fn send(&self, message: &FeedMessage) -> Result<()> {
        let socket = match &self.socket {
            Some(socket) if self.state.is_open() => socket,
            _ => return Err(WsError::NotConnected.into()),
        };

        let json = serde_json::to_string(message)?;
        socket
            .send(json)
            .map_err(|_e| WsError::ConnectionClosed)?;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<()> {
        self.send(&FeedMessage::subscribe(topic))?;
        self.subscribed.insert(topic);

        #[cfg(feature = "tracing")]
        tracing::debug!(feed_category = topic, "Subscribing to feed category");

        Ok(())
    }

    fn unsubscribe(&mut self, topic: &str) -> Result<()> {
        self.send(&FeedMessage::unsubscribe(topic))?;
        self.subscribed.remove(topic);

        #[cfg(feature = "tracing")]
        tracing::debug!(feed_category = topic, "Unsubscribing from feed category");

        Ok(())
    }
}

struct Inner {
    endpoint: String,
    config: Config,
    shared: Mutex<Shared>,
    dispatcher: Arc<Dispatcher>,
    state_tx: watch::Sender<ConnectionState>,
    events_tx: broadcast::Sender<ConnectionEvent>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let shared = self.shared.get_mut().unwrap_or_else(PoisonError::into_inner);
        shared.session.cancel();
        if let Some(timer) = shared.reconnect_timer.take() {
            timer.abort();
        }
    }
}

/// Manages the feed WebSocket: connection lifecycle, heartbeat, reconnection and the set of
/// subscribed topics.
///
/// All socket events of one connection (inbound frames, outbound requests, heartbeat ticks,
/// cancellation) are handled sequentially by a single task, and all bookkeeping sits behind
/// one lock, so caller operations and connection events never interleave mid-update.
///
/// Cloning is cheap and every clone controls the same connection. Dropping the last clone
/// closes the socket and cancels pending reconnects.
///
/// # Example
///
/// ```ignore
/// let connection = ConnectionManager::new(endpoint, Config::default(), topics);
/// connection.on_message(MessageType::Data, |msg| println!("{msg:?}"));
/// connection.connect(true).await?;
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("subscribed", &self.subscribed_topics())
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Create a connection manager for `endpoint`. No network activity happens until
    /// [`Self::connect`] is called.
    ///
    /// `endpoint` is the full WebSocket URL, including any authentication query parameters.
    /// `topics` are the feed categories subscribed on every auto-subscribing open.
    #[must_use]
    pub fn new(endpoint: String, config: Config, topics: Vec<String>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let backoff = ReconnectBackoff::new(config.reconnect.clone());

        Self {
            inner: Arc::new(Inner {
                endpoint,
                config,
                shared: Mutex::new(Shared {
                    state: ConnectionState::Disconnected,
                    socket: None,
                    generation: 0,
                    subscribed: TopicSet::new(),
                    topics,
                    backoff,
                    session: CancellationToken::new(),
                    reconnect_timer: None,
                }),
                dispatcher: Arc::new(Dispatcher::new()),
                state_tx,
                events_tx,
            }),
        }
    }

    /// Open the connection.
    ///
    /// Returns immediately when already open. When another connect is in flight, waits for
    /// it and retries if it failed. With `auto_subscribe`, one subscribe request per
    /// configured topic is sent, in configured order, before this returns.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::WebSocket`] error when the socket cannot be opened or
    /// [`Self::disconnect`] is called while connecting. A failed caller-initiated connect does
    /// not schedule reconnects.
    pub async fn connect(&self, auto_subscribe: bool) -> Result<()> {
        self.inner.open(auto_subscribe, Origin::Caller).await
    }

    /// Close the connection without reconnecting.
    ///
    /// Cancels any pending reconnect timer and any connect in flight. The state moves to
    /// [`ConnectionState::Closing`] and then to [`ConnectionState::Disconnected`] once the
    /// close handshake finishes.
    pub fn disconnect(&self) {
        let mut shared = self.inner.lock();

        // A reconnect task already inside `open` moves `Connecting` back to `Disconnected`
        // once the token fires, so it must not be aborted here.
        shared.session.cancel();
        shared.session = CancellationToken::new();
        shared.reconnect_timer = None;

        if shared.state.is_open() {
            shared.socket = None;
            self.inner.set_state(&mut shared, ConnectionState::Closing);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Disconnect requested");
    }

    /// Subscribe to a feed category on the open connection.
    ///
    /// The topic is recorded as subscribed as soon as the request is queued; server
    /// confirmations are only logged.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::NotConnected`] error, without side effects, unless the
    /// connection is [`ConnectionState::Open`].
    pub fn subscribe(&self, topic: &str) -> Result<()> {
        self.inner.lock().subscribe(topic)
    }

    /// Unsubscribe from a feed category on the open connection.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::NotConnected`] error, without side effects, unless the
    /// connection is [`ConnectionState::Open`].
    pub fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.inner.lock().unsubscribe(topic)
    }

    /// Replace the configured topics.
    ///
    /// While open, unsubscribes from subscribed topics missing from `topics` and subscribes to
    /// listed topics not yet subscribed; topics in both are untouched. Otherwise only the
    /// configured list changes, and it applies on the next auto-subscribing connect.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Validation`] error, leaving everything unchanged, when a
    /// topic is blank.
    pub fn set_topics(&self, topics: Vec<String>) -> Result<()> {
        validate_topics(&topics)?;

        let mut shared = self.inner.lock();
        shared.topics = topics;

        if !shared.state.is_open() {
            return Ok(());
        }

        let plan = shared.subscribed.reconcile(&shared.topics);
        for topic in &plan.unsubscribe {
            shared.unsubscribe(topic)?;
        }
        for topic in &plan.subscribe {
            shared.subscribe(topic)?;
        }

        Ok(())
    }

    /// The configured topics.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.inner.lock().topics.clone()
    }

    /// Topics subscribed on the current connection, in subscription order.
    #[must_use]
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.inner.lock().subscribed.to_vec()
    }

    /// Register the handler for one message type, replacing any previous handler for it.
    ///
    /// Handlers run on the connection task after the built-in handling of the message.
    /// A panicking handler is caught and logged.
    pub fn on_message<F>(&self, message_type: MessageType, handler: F)
    where
        F: Fn(&FeedMessage) + Send + Sync + 'static,
    {
        let handler: MessageHandler = Arc::new(handler);
        self.inner.dispatcher.set_handler(message_type, handler);
    }

    /// Remove the handler registered for `message_type`.
    pub fn remove_handler(&self, message_type: MessageType) {
        drop(self.inner.dispatcher.remove_handler(message_type));
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Number of reconnect attempts scheduled since the connection last opened.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.lock().backoff.attempts()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Subscribe to lifecycle events, including [`ConnectionEvent::ReconnectExhausted`].
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.inner.events_tx.subscribe()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Recovering is sound: every critical section leaves `Shared` consistent before it
        // can panic.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, shared: &mut Shared, state: ConnectionState) {
        shared.state = state;
        self.state_tx.send_replace(state);
    }

    fn emit(&self, event: ConnectionEvent) {
        _ = self.events_tx.send(event);
    }

    async fn open(self: &Arc<Self>, auto_subscribe: bool, origin: Origin) -> Result<()> {
        let session = loop {
            let mut state_rx = {
                let mut shared = self.lock();

                if let Origin::Reconnect(token) = &origin
                    && token.is_cancelled()
                {
                    return Err(WsError::ConnectionClosed.into());
                }

                match shared.state {
                    ConnectionState::Open => return Ok(()),
                    ConnectionState::Disconnected => {
                        self.set_state(&mut shared, ConnectionState::Connecting);
                        break shared.session.clone();
                    }
                    ConnectionState::Connecting | ConnectionState::Closing => {
                        self.state_tx.subscribe()
                    }
                }
            };

            if state_rx.changed().await.is_err() {
                return Err(WsError::ConnectionClosed.into());
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(reconnect = matches!(origin, Origin::Reconnect(_)), "Connecting to feed");

        let connected: Result<_> = tokio::select! {
            () = session.cancelled() => Err(WsError::ConnectionClosed.into()),
            result = connect_async(self.endpoint.as_str()) => result.map_err(Error::from),
        };

        let mut shared = self.lock();

        let ws_stream = match connected {
            Ok(_) if session.is_cancelled() => {
                self.set_state(&mut shared, ConnectionState::Disconnected);
                return Err(WsError::ConnectionClosed.into());
            }
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "Unable to connect to feed");
                self.set_state(&mut shared, ConnectionState::Disconnected);
                return Err(e);
            }
        };

        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        shared.generation = shared.generation.wrapping_add(1);
        let generation = shared.generation;
        shared.socket = Some(socket_tx);
        shared.subscribed.clear();
        shared.backoff.reset();
        shared.reconnect_timer = None;
        self.set_state(&mut shared, ConnectionState::Open);

        #[cfg(feature = "tracing")]
        tracing::info!("Connected to feed WebSocket");

        tokio::spawn(Self::run(
            Arc::downgrade(self),
            ws_stream,
            socket_rx,
            session,
            generation,
            self.config.heartbeat_interval,
            Arc::clone(&self.dispatcher),
        ));

        if auto_subscribe {
            let topics = shared.topics.clone();
            for topic in &topics {
                shared.subscribe(topic)?;
            }
        }

        drop(shared);
        self.emit(ConnectionEvent::Opened);

        Ok(())
    }

    /// Drive one open connection until it closes, then hand the outcome back to the manager.
    async fn run(
        manager: Weak<Self>,
        ws_stream: WsStream,
        mut socket_rx: mpsc::UnboundedReceiver<String>,
        session: CancellationToken,
        generation: u64,
        heartbeat_interval: Duration,
        dispatcher: Arc<Dispatcher>,
    ) {
        let (mut write, mut read) = ws_stream.split();

        // The timer lives only as long as this task, so it cannot tick after the close.
        let period = heartbeat_interval.max(Duration::from_millis(1));
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let closure = loop {
            tokio::select! {
                () = session.cancelled() => {
                    _ = write.send(Message::Close(None)).await;
                    break Closure::Intentional;
                }

                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(text = %text.as_str(), "Received feed message");

                            if let Err(e) = Self::handle_text(text.as_bytes(), &dispatcher, &mut write).await {
                                break Closure::Failed(e);
                            }
                        }
                        Some(Ok(Message::Close(frame))) => break Closure::Remote(frame),
                        Some(Ok(_)) => {
                            // Binary frames are not part of the protocol; protocol-level
                            // pings are answered by tungstenite itself.
                        }
                        Some(Err(e)) => break Closure::Failed(e.into()),
                        None => break Closure::Remote(None),
                    }
                }

                Some(json) = socket_rx.recv() => {
                    if let Err(e) = write.send(Message::Text(json.into())).await {
                        break Closure::Failed(e.into());
                    }
                }

                _ = heartbeat.tick() => {
                    let ping = FeedMessage::ping(chrono::Utc::now().timestamp_millis());
                    if let Err(e) = Self::send_message(&mut write, &ping).await {
                        break Closure::Failed(e);
                    }
                }
            }
        };

        drop(heartbeat);

        #[cfg(feature = "tracing")]
        match &closure {
            Closure::Intentional => tracing::info!("Feed WebSocket closed"),
            Closure::Remote(frame) => tracing::info!(?frame, "Feed WebSocket connection closed"),
            Closure::Failed(e) => tracing::warn!(error = %e, "Feed WebSocket connection failed"),
        }

        if let Some(manager) = manager.upgrade() {
            manager.closed(generation, &closure, &session);
        }
    }

    /// Validate one text frame and dispatch its messages in order.
    ///
    /// Invalid frames are dropped with a diagnostic. Only a failure to write an automatic
    /// reply is returned.
    async fn handle_text(bytes: &[u8], dispatcher: &Dispatcher, write: &mut WsWrite) -> Result<()> {
        let messages = match parse_messages(bytes) {
            Ok(messages) => messages,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    text = %String::from_utf8_lossy(bytes),
                    error = %e,
                    "Dropping invalid feed message"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
                return Ok(());
            }
        };

        for message in messages {
            if let Some(reply) = dispatcher.dispatch(&message) {
                Self::send_message(write, &reply).await?;
            }
        }

        Ok(())
    }

    async fn send_message(write: &mut WsWrite, message: &FeedMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        write.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Transition to `Disconnected` after the connection identified by `generation` ended.
    fn closed(self: &Arc<Self>, generation: u64, closure: &Closure, session: &CancellationToken) {
        let mut shared = self.lock();

        // A newer connection already owns the slot.
        if shared.generation != generation {
            return;
        }

        shared.socket = None;
        shared.subscribed.clear();
        self.set_state(&mut shared, ConnectionState::Disconnected);

        let intentional = matches!(closure, Closure::Intentional) || session.is_cancelled();
        self.emit(ConnectionEvent::Closed { intentional });

        if !intentional {
            self.schedule_reconnect(&mut shared);
        }
    }

    /// Schedule the next reconnect attempt, or report that attempts are exhausted.
    fn schedule_reconnect(self: &Arc<Self>, shared: &mut Shared) {
        let Some(delay) = shared.backoff.next_backoff() else {
            let attempts = shared.backoff.attempts();
            let error = WsError::ReconnectExhausted { attempts };
            #[cfg(feature = "tracing")]
            tracing::error!(%error, "Giving up on feed connection");
            #[cfg(not(feature = "tracing"))]
            let _ = &error;
            self.emit(ConnectionEvent::ReconnectExhausted { attempts });
            return;
        };

        let attempt = shared.backoff.attempts();

        #[cfg(feature = "tracing")]
        tracing::info!(
            ?delay,
            attempt,
            max_attempts = ?self.config.reconnect.max_attempts,
            "Attempting to reconnect"
        );

        self.emit(ConnectionEvent::ReconnectScheduled { attempt, delay });

        let session = shared.session.clone();
        let manager = Arc::downgrade(self);

        let timer = tokio::spawn(async move {
            tokio::select! {
                () = session.cancelled() => return,
                () = sleep(delay) => {}
            }

            let Some(manager) = manager.upgrade() else {
                return;
            };

            if let Err(e) = manager
                .open(true, Origin::Reconnect(session.clone()))
                .await
            {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, attempt, "Reconnect attempt failed");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;

                let mut shared = manager.lock();
                if !session.is_cancelled() && shared.state == ConnectionState::Disconnected {
                    manager.schedule_reconnect(&mut shared);
                }
            }
        });

        shared.reconnect_timer = Some(timer.abort_handle());
    }
}
