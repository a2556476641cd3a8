//! Client configuration and its construction-time validation.

use bon::Builder;
use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use crate::Result;
use crate::error::Error;
use crate::ws::config::Config as WsConfig;

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_VAR: &str = "GLORIA_AI_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://ai-hub.cryptobriefing.com";
pub const DEFAULT_WS_URL: &str = "wss://ai-hub.cryptobriefing.com/ws/feed";
pub const DEFAULT_TOPICS: [&str; 5] = ["crypto", "ai_agents", "macro", "rwa", "tech"];
pub const DEFAULT_LIMIT: u32 = 40;
pub const DEFAULT_TIMEFRAME: &str = "12h";

fn default_topics() -> Vec<String> {
    DEFAULT_TOPICS.iter().map(|&t| t.to_owned()).collect()
}

/// Configuration for [`crate::Client`].
///
/// Everything except the API key has a default. When `api_key` is absent (or blank) the
/// value of [`API_KEY_VAR`] is used instead.
///
/// ```
/// use gloria_client_sdk::Config;
///
/// let config = Config::builder()
///     .api_key("my-token")
///     .topics(vec!["crypto".to_owned(), "macro".to_owned()])
///     .default_limit(20)
///     .build();
/// ```
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    #[builder(into)]
    api_key: Option<SecretString>,
    #[builder(into, default = DEFAULT_BASE_URL.to_owned())]
    base_url: String,
    #[builder(into, default = DEFAULT_WS_URL.to_owned())]
    ws_url: String,
    /// Feed categories used for auto-subscription and as the default HTTP filter.
    #[builder(default = default_topics())]
    topics: Vec<String>,
    /// Page size for [`crate::Client::fetch_news`] when the request does not set one.
    #[builder(default = DEFAULT_LIMIT)]
    default_limit: u32,
    /// Timeframe for recap requests when none is given, e.g. `12h` or `24h`.
    #[builder(into, default = DEFAULT_TIMEFRAME.to_owned())]
    default_timeframe: String,
    /// Heartbeat and reconnection tuning for the feed connection.
    #[builder(default)]
    ws: WsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

/// A [`Config`] that passed validation, with the API key resolved and URLs parsed.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) api_key: SecretString,
    pub(crate) base_url: Url,
    pub(crate) ws_url: Url,
    pub(crate) topics: Vec<String>,
    pub(crate) default_limit: u32,
    pub(crate) default_timeframe: String,
    pub(crate) ws: WsConfig,
}

impl Config {
    /// Validate this configuration, falling back to [`API_KEY_VAR`] for the API key.
    pub(crate) fn into_settings(self) -> Result<Settings> {
        let env_key = std::env::var(API_KEY_VAR).ok();
        self.into_settings_with(env_key)
    }

    pub(crate) fn into_settings_with(self, env_key: Option<String>) -> Result<Settings> {
        let api_key = resolve_api_key(self.api_key, env_key).ok_or_else(|| {
            Error::configuration(format!(
                "API key is required. Set {API_KEY_VAR} env variable or pass it in config"
            ))
        })?;

        let mut base_url = parse_url("base_url", &self.base_url, &["http", "https"])?;
        // Endpoint paths are joined onto the base, which only appends below a trailing `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let ws_url = parse_url("ws_url", &self.ws_url, &["ws", "wss"])?;

        validate_topics(&self.topics)?;
        if self.default_limit == 0 {
            return Err(Error::validation("default_limit must be greater than zero"));
        }
        if self.default_timeframe.trim().is_empty() {
            return Err(Error::validation("default_timeframe must not be empty"));
        }

        Ok(Settings {
            api_key,
            base_url,
            ws_url,
            topics: self.topics,
            default_limit: self.default_limit,
            default_timeframe: self.default_timeframe,
            ws: self.ws,
        })
    }
}

/// Every topic must be a non-blank feed category.
pub(crate) fn validate_topics<S: AsRef<str>>(topics: &[S]) -> Result<()> {
    if let Some(position) = topics.iter().position(|t| t.as_ref().trim().is_empty()) {
        return Err(Error::validation(format!(
            "topics[{position}] must be a non-empty feed category"
        )));
    }
    Ok(())
}

/// An explicit key wins unless it is blank, in which case the environment value is used.
fn resolve_api_key(explicit: Option<SecretString>, env: Option<String>) -> Option<SecretString> {
    explicit
        .filter(|key| !key.expose_secret().trim().is_empty())
        .or_else(|| {
            env.filter(|key| !key.trim().is_empty())
                .map(SecretString::from)
        })
}

fn parse_url(field: &str, value: &str, schemes: &[&str]) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| Error::validation(format!("{field} is not a valid URL ({value}): {e}")))?;

    if !schemes.contains(&url.scheme()) {
        return Err(Error::validation(format!(
            "{field} must use one of {schemes:?}, got {}",
            url.scheme()
        )));
    }

    Ok(url)
}
