//! Fetches one recap, then recaps for every configured topic concurrently.
//!
//! ```sh
//! RUST_LOG=info cargo run --example fetch_recaps --features tracing
//! ```

use gloria_client_sdk::news::types::Recap;
use gloria_client_sdk::{Client, Config};
use tracing::{info, warn};

fn excerpt(recap: &Recap, max_chars: usize) -> String {
    recap
        .get("recap")
        .and_then(serde_json::Value::as_str)
        .map(|text| text.chars().take(max_chars).collect())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::builder()
        .topics(vec![
            "crypto".to_owned(),
            "macro".to_owned(),
            "tech".to_owned(),
        ])
        .default_timeframe("12h")
        .build();
    let client = Client::new(config)?;

    let recap = client.fetch_recap(Some("crypto"), None).await?;
    info!(endpoint = "recaps", topic = "crypto", timeframe = "12h", recap = %excerpt(&recap, 300));

    for (topic, result) in client.fetch_all_recaps(Some("24h")).await {
        match result {
            Ok(recap) => info!(endpoint = "recaps", %topic, timeframe = "24h", recap = %excerpt(&recap, 200)),
            Err(e) => warn!(endpoint = "recaps", %topic, error = %e),
        }
    }

    Ok(())
}
