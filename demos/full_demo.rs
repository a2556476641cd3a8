//! Tour of the whole client: latest news, recaps for every topic, then the live feed.
//!
//! ```sh
//! RUST_LOG=info cargo run --example full_demo --features tracing
//! ```

use chrono::DateTime;
use gloria_client_sdk::config::DEFAULT_TOPICS;
use gloria_client_sdk::news::types::NewsRequest;
use gloria_client_sdk::ws::types::MessageType;
use gloria_client_sdk::{Client, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::builder()
        .topics(DEFAULT_TOPICS.iter().map(|topic| (*topic).to_owned()).collect())
        .default_limit(20)
        .default_timeframe("24h")
        .build();
    let client = Client::new(config)?;

    let news = client
        .fetch_news(&NewsRequest::builder().limit(5).build())
        .await?;
    for item in &news {
        let published = DateTime::from_timestamp(item.timestamp, 0)
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        info!(section = "news", %published, signal = %item.signal);
    }

    for (topic, result) in client.fetch_all_recaps(Some("12h")).await {
        match result {
            Ok(recap) => {
                let text: String = recap
                    .get("recap")
                    .and_then(serde_json::Value::as_str)
                    .map(|text| text.chars().take(100).collect())
                    .unwrap_or_default();
                info!(section = "recaps", %topic, recap = %text);
            }
            Err(e) => warn!(section = "recaps", %topic, error = %e),
        }
    }

    client.on_message(MessageType::Data, |message| {
        let signal = message
            .content
            .as_ref()
            .and_then(|content| content.get("signal"))
            .and_then(serde_json::Value::as_str);
        if let Some(signal) = signal {
            let category = message.feed_category.as_deref().unwrap_or("update");
            info!(section = "live", %category, %signal);
        }
    });

    if let Err(e) = client.connect(true).await {
        warn!(error = %e, "unable to connect to the live feed");
        return Err(e.into());
    }
    info!(subscribed = ?client.subscribed_topics(), "listening for updates, Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    client.disconnect();

    Ok(())
}
