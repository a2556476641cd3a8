//! HTTP helpers for the news hub's REST endpoints.
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/news` | GET | Paginated news items for a set of feed categories |
//! | `/recaps` | GET | Summary of one feed category over a timeframe |
//!
//! These are plain request/response calls without retries. The client is normally used
//! through [`crate::Client`], which shares its configuration with the feed connection.

pub mod client;
pub mod types;

pub use client::Client;
