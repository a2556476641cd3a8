use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the `GET /news` listing.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Headline of the item.
    pub signal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_category: Option<String>,
    /// Attributes outside the known schema, e.g. sources or summaries.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A topic recap from `GET /recaps`.
///
/// The service does not fix the recap schema, so every attribute is kept as JSON.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recap {
    pub fields: Map<String, Value>,
}

impl Recap {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
