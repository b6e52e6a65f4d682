//! file2http - read lines from stdin and send each one as an HTTP request.
//!
//! Lines are published concurrently by a pool of publishers. Publish errors
//! are logged to stderr and the offending line is dropped; the process exits
//! once every line has been handled.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{self, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use file2http::{relay, Config, HttpTransport, Publisher, PublisherConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging on stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
        .init();

    // Parse and validate configuration before anything is started
    let config = Config::from_args().context("Invalid configuration")?;
    tracing::info!(
        addr = %config.addr,
        method = %config.method,
        content_type = ?config.content_type,
        publishers = config.publishers,
        url_transform = config.url_rules.is_some(),
        timestamp_fields = ?config.timestamp_fields,
        "config_loaded"
    );

    let transport = HttpTransport::new(config.publishers)
        .context("Failed to create HTTP client")?;
    let publisher = Publisher::new(PublisherConfig::from(&config), Arc::new(transport));

    let input = BufReader::new(io::stdin());
    relay::run(input, publisher, config.publishers).await;

    Ok(())
}
