use std::collections::BTreeMap;

use secrecy::ExposeSecret as _;
use tokio::sync::{broadcast, watch};

use crate::Result;
use crate::config::Config;
use crate::news;
use crate::news::types::{NewsItem, NewsRequest, Recap};
use crate::ws::types::{FeedMessage, MessageType};
use crate::ws::{ConnectionEvent, ConnectionManager, ConnectionState};

/// Client for the news hub: live feed over WebSocket plus the `news` and `recaps` HTTP
/// endpoints.
///
/// # Example
///
/// ```no_run
/// use gloria_client_sdk::{Client, Config};
/// use gloria_client_sdk::ws::types::MessageType;
///
/// # async fn example() -> gloria_client_sdk::Result<()> {
/// let client = Client::new(Config::builder().api_key("my-token").build())?;
///
/// client.on_message(MessageType::Data, |msg| {
///     println!("{:?}: {:?}", msg.feed_category, msg.content);
/// });
/// client.connect(true).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    news: news::Client,
    connection: ConnectionManager,
}

impl Client {
    /// Validate `config` and build a client. Nothing touches the network yet.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Configuration`] error when no API key is configured
    /// (explicitly or through [`crate::config::API_KEY_VAR`]) and a
    /// [`crate::error::Kind::Validation`] error for malformed settings.
    pub fn new(config: Config) -> Result<Client> {
        let settings = config.into_settings()?;
        let news = news::Client::new(&settings)?;

        let mut endpoint = settings.ws_url.clone();
        endpoint
            .query_pairs_mut()
            .append_pair("token", settings.api_key.expose_secret());

        let connection = ConnectionManager::new(endpoint.into(), settings.ws, settings.topics);

        Ok(Self { news, connection })
    }

    /// The HTTP half of the client.
    #[must_use]
    pub fn news(&self) -> &news::Client {
        &self.news
    }

    /// The feed connection, for lower-level access such as [`ConnectionManager::reconnect_attempts`].
    #[must_use]
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// See [`ConnectionManager::connect`].
    pub async fn connect(&self, auto_subscribe: bool) -> Result<()> {
        self.connection.connect(auto_subscribe).await
    }

    /// See [`ConnectionManager::disconnect`].
    pub fn disconnect(&self) {
        self.connection.disconnect();
    }

    /// See [`ConnectionManager::subscribe`].
    pub fn subscribe(&self, topic: &str) -> Result<()> {
        self.connection.subscribe(topic)
    }

    /// See [`ConnectionManager::unsubscribe`].
    pub fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.connection.unsubscribe(topic)
    }

    /// Register the handler for `message_type`. A later registration for the same type
    /// replaces this one.
    pub fn on_message<F>(&self, message_type: MessageType, handler: F)
    where
        F: Fn(&FeedMessage) + Send + Sync + 'static,
    {
        self.connection.on_message(message_type, handler);
    }

    pub fn remove_handler(&self, message_type: MessageType) {
        self.connection.remove_handler(message_type);
    }

    /// Topics subscribed on the current connection.
    #[must_use]
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.connection.subscribed_topics()
    }

    /// The configured topics.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.connection.topics()
    }

    /// See [`ConnectionManager::set_topics`].
    pub fn set_topics(&self, topics: Vec<String>) -> Result<()> {
        self.connection.set_topics(topics)
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Watch connection state transitions.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.connection.state_receiver()
    }

    /// Lifecycle events, including exhausted reconnects.
    #[must_use]
    pub fn connection_events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.connection.events()
    }

    /// See [`news::Client::fetch_news`].
    pub async fn fetch_news(&self, request: &NewsRequest) -> Result<Vec<NewsItem>> {
        self.news.fetch_news(request).await
    }

    /// See [`news::Client::fetch_recap`].
    pub async fn fetch_recap(&self, category: Option<&str>, timeframe: Option<&str>) -> Result<Recap> {
        self.news.fetch_recap(category, timeframe).await
    }

    /// See [`news::Client::fetch_all_recaps`].
    pub async fn fetch_all_recaps(&self, timeframe: Option<&str>) -> BTreeMap<String, Result<Recap>> {
        self.news.fetch_all_recaps(timeframe).await
    }
}
