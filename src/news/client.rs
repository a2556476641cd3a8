use std::collections::BTreeMap;

use futures::future::join_all;
use reqwest::{
    Client as ReqwestClient, Method,
    header::{HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::request::{NewsQuery, NewsRequest, RecapQuery};
use super::types::response::{NewsItem, Recap};
use crate::config::{Settings, validate_topics};
use crate::error::Error;
use crate::{Result, ToQueryParams as _};

/// HTTP client for the news hub's `news` and `recaps` endpoints.
///
/// Every request carries the API token as the `token` query parameter. Feed categories, page
/// size and recap timeframe fall back to the client configuration.
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
    token: SecretString,
    topics: Vec<String>,
    default_limit: u32,
    default_timeframe: String,
}

impl Client {
    pub(crate) fn new(settings: &Settings) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("gloria_client_sdk"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            host: settings.base_url.clone(),
            client,
            token: settings.api_key.clone(),
            topics: settings.topics.clone(),
            default_limit: settings.default_limit,
            default_timeframe: settings.default_timeframe.clone(),
        })
    }

    /// Returns the base URL of the API.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    async fn get<Req: Serialize, Res: DeserializeOwned>(&self, path: &str, req: &Req) -> Result<Res> {
        let query = req.query_params();
        let mut url = self.host.join(path)?;
        url.set_query(query.strip_prefix('?'));

        let request = self.client.request(Method::GET, url).build()?;
        crate::request(&self.client, request).await
    }

    /// List news items.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Validation`] error, before any request is sent, when
    /// `page` or `limit` is zero or the topic list is empty or contains a blank entry.
    /// Returns a [`crate::error::Kind::Status`] error for a non-success response.
    pub async fn fetch_news(&self, request: &NewsRequest) -> Result<Vec<NewsItem>> {
        let page = request.page.unwrap_or(1);
        let limit = request.limit.unwrap_or(self.default_limit);
        let topics = request.topics.as_ref().unwrap_or(&self.topics);

        if page == 0 {
            return Err(Error::validation("page must be at least 1"));
        }
        if limit == 0 {
            return Err(Error::validation("limit must be greater than zero"));
        }
        if topics.is_empty() {
            return Err(Error::validation("at least one feed category is required"));
        }
        validate_topics(topics)?;

        let query = NewsQuery {
            token: self.token.expose_secret(),
            feed_categories: topics.clone(),
            page,
            limit,
            from_date: request.from_date.as_deref(),
            to_date: request.to_date.as_deref(),
        };

        self.get("news", &query).await
    }

    /// Fetch the recap of one feed category.
    ///
    /// `category` defaults to the first configured topic and `timeframe` to the configured
    /// default.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Validation`] error when no category is given and none
    /// is configured, and a [`crate::error::Kind::Status`] error for a non-success response.
    pub async fn fetch_recap(&self, category: Option<&str>, timeframe: Option<&str>) -> Result<Recap> {
        let feed_category = category
            .or_else(|| self.topics.first().map(String::as_str))
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::validation("a feed category is required for recaps"))?;

        let query = RecapQuery {
            token: self.token.expose_secret(),
            feed_category,
            timeframe: timeframe.unwrap_or(&self.default_timeframe),
        };

        self.get("recaps", &query).await
    }

    /// Fetch recaps for every configured topic concurrently.
    ///
    /// One failing topic does not fail the others: each topic maps to its own result.
    pub async fn fetch_all_recaps(&self, timeframe: Option<&str>) -> BTreeMap<String, Result<Recap>> {
        let requests = self.topics.iter().map(|topic| async move {
            let recap = self.fetch_recap(Some(topic.as_str()), timeframe).await;

            #[cfg(feature = "tracing")]
            if let Err(e) = &recap {
                tracing::warn!(feed_category = %topic, error = %e, "Failed to fetch recap");
            }

            (topic.clone(), recap)
        });

        join_all(requests).await.into_iter().collect()
    }
}
