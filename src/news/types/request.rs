#![expect(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use serde::Serialize;
use serde_with::{StringWithSeparator, formats::CommaSeparator, serde_as, skip_serializing_none};

/// Parameters for [`crate::news::Client::fetch_news`].
///
/// Every field is optional: `page` defaults to 1, `limit` to the configured page size and
/// `topics` to the configured feed categories.
///
/// # Example
///
/// ```
/// use gloria_client_sdk::news::types::request::NewsRequest;
///
/// let request = NewsRequest::builder()
///     .page(2)
///     .limit(10)
///     .from_date("2025-07-01")
///     .topics(vec!["crypto".to_owned()])
///     .build();
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, Builder)]
pub struct NewsRequest {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
    /// Lower bound of the listing, passed through as given (e.g. `2025-07-01`).
    #[builder(into)]
    pub from_date: Option<String>,
    /// Upper bound of the listing, passed through as given.
    #[builder(into)]
    pub to_date: Option<String>,
    /// Feed categories to list; replaces the configured topics for this request.
    pub topics: Option<Vec<String>>,
}

/// Query string of `GET /news`, after defaults are applied.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub(crate) struct NewsQuery<'req> {
    pub token: &'req str,
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    pub feed_categories: Vec<String>,
    pub page: u32,
    pub limit: u32,
    pub from_date: Option<&'req str>,
    pub to_date: Option<&'req str>,
}

/// Query string of `GET /recaps`.
#[derive(Debug, Serialize)]
pub(crate) struct RecapQuery<'req> {
    pub token: &'req str,
    pub feed_category: &'req str,
    pub timeframe: &'req str,
}
