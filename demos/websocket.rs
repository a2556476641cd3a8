//! Streams live headlines until Ctrl+C.
//!
//! Connects with auto-subscription to the configured topics, prints every `data` message and
//! logs connection events such as scheduled reconnects.
//!
//! ```sh
//! RUST_LOG=info,gloria_client_sdk=debug cargo run --example websocket --features tracing
//! ```

use std::time::Duration;

use gloria_client_sdk::ws::types::{FeedMessage, MessageType};
use gloria_client_sdk::{Client, Config};
use tracing::info;

fn signal(message: &FeedMessage) -> Option<&str> {
    message.content.as_ref()?.get("signal")?.as_str()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::builder()
        .topics(vec![
            "crypto".to_owned(),
            "macro".to_owned(),
            "ai_agents".to_owned(),
        ])
        .build();
    let client = Client::new(config)?;

    client.on_message(MessageType::Data, |message| {
        if let Some(signal) = signal(message) {
            let category = message.feed_category.as_deref().unwrap_or("news");
            info!(stream = "feed", %category, %signal);
        }
    });

    let mut events = client.connection_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(stream = "connection", event = ?event);
        }
    });

    client.connect(true).await?;
    info!(subscribed = ?client.subscribed_topics(), "connected");

    let late = client.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        match late.subscribe("tech") {
            Ok(()) => info!(topic = "tech", "added subscription"),
            Err(e) => info!(topic = "tech", error = %e, "subscription skipped"),
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("closing connection");
    client.disconnect();

    Ok(())
}
