//! Fetches news with the configured defaults, then with explicit paging and a topic override.
//!
//! ```sh
//! RUST_LOG=info cargo run --example fetch_news --features tracing
//! ```

use chrono::DateTime;
use gloria_client_sdk::news::types::NewsRequest;
use gloria_client_sdk::{Client, Config};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::builder()
        .topics(vec![
            "crypto".to_owned(),
            "ai_agents".to_owned(),
            "macro".to_owned(),
        ])
        .build();
    let client = Client::new(config)?;

    let news = client.fetch_news(&NewsRequest::default()).await?;
    info!(endpoint = "news", count = news.len(), "fetched with defaults");

    let request = NewsRequest::builder()
        .page(1)
        .limit(5)
        .topics(vec!["crypto".to_owned()])
        .build();
    for item in client.fetch_news(&request).await? {
        let published = DateTime::from_timestamp(item.timestamp, 0)
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        info!(endpoint = "news", %published, signal = %item.signal);
    }

    Ok(())
}
