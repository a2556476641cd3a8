//! Smallest possible usage: read the API key from `GLORIA_AI_API_KEY` and print three headlines.
//!
//! ```sh
//! GLORIA_AI_API_KEY=... cargo run --example minimal
//! ```
#![allow(clippy::print_stdout, reason = "demo output goes to the terminal")]

use gloria_client_sdk::news::types::NewsRequest;
use gloria_client_sdk::{Client, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new(Config::default())?;

    let request = NewsRequest::builder()
        .limit(3)
        .topics(vec!["crypto".to_owned()])
        .build();
    for item in client.fetch_news(&request).await? {
        println!("{}", item.signal);
    }

    Ok(())
}
