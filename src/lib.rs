//! Client SDK for the Gloria AI news hub.
//!
//! The hub publishes curated news on a set of feed categories (`crypto`, `macro`, ...).
//! [`Client`] combines the live WebSocket feed, which keeps itself connected and subscribed,
//! with the `news` and `recaps` HTTP endpoints.
//!
//! ```no_run
//! use gloria_client_sdk::{Client, Config};
//! use gloria_client_sdk::news::types::NewsRequest;
//!
//! # async fn example() -> gloria_client_sdk::Result<()> {
//! // The API key falls back to the GLORIA_AI_API_KEY environment variable.
//! let client = Client::new(Config::default())?;
//!
//! let items = client
//!     .fetch_news(&NewsRequest::builder().limit(5).build())
//!     .await?;
//! for item in items {
//!     println!("[{}] {}", item.timestamp, item.signal);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `tracing`: structured logging of the connection lifecycle, HTTP requests and unknown
//!   response fields

pub mod client;
pub mod config;
pub mod error;
pub mod news;
pub(crate) mod serde_helpers;
pub mod ws;

use reqwest::{Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use crate::client::Client;
pub use crate::config::Config;
use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Trait for converting request types to URL query parameters.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields into a query string.
pub trait ToQueryParams: Serialize {
    /// Converts the request to a URL query string.
    ///
    /// Returns an empty string if no parameters are set, otherwise returns
    /// a string starting with `?` followed by URL-encoded key-value pairs.
    fn query_params(&self) -> String {
        let params = serde_html_form::to_string(self)
            .inspect_err(|e| {
                #[cfg(feature = "tracing")]
                tracing::error!("Unable to convert to URL-encoded string {e:?}");
                #[cfg(not(feature = "tracing"))]
                let _: &serde_html_form::ser::Error = e;
            })
            .unwrap_or_default();

        if params.is_empty() {
            String::new()
        } else {
            format!("?{params}")
        }
    }
}

impl<T: Serialize> ToQueryParams for T {}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    request: Request,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<serde_json::Value>().await?;
    let response_data: Option<Response> = serde_helpers::deserialize_with_warnings(json_value)?;

    if let Some(response) = response_data {
        Ok(response)
    } else {
        #[cfg(feature = "tracing")]
        tracing::warn!(method = %method, path = %path, "API resource not found");
        Err(Error::status(
            StatusCode::NOT_FOUND,
            method,
            path,
            "Unable to find requested resource",
        ))
    }
}
