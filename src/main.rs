//! # Oxide-Tagger CLI
//!
//! Attaches to a Chromium instance over the DevTools Protocol, tags the
//! current page and prints a JSON snapshot to stdout.
//!
//! ## Environment variables
//! - `TAGGER_CDP_ENDPOINT`: DevTools endpoint (default: ws://localhost:9222)
//! - `TAGGER_START_URL`: page to open; the first open page is used otherwise
//! - `TAGGER_LEAVE_HOST`: count links to other hosts as clickable (default: false)
//! - `TAGGER_COMMAND_TIMEOUT`: CDP command timeout in ms (default: 30000)
//! - `TAGGER_LOG_LEVEL`: log filter when `RUST_LOG` is unset (default: info)
//! - `TAGGER_CONFIG`: TOML file with the same settings

use anyhow::Context;
use oxide_tagger::{
    cdp::{CdpBrowser, CdpBrowserImpl, CdpTimeoutConfig},
    config::Config,
    session::{BrowserSession, CdpSession},
    Tagger, TaggerOptions,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("parsing log filter")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber")?;

    info!("Oxide-Tagger v{}", oxide_tagger::VERSION);
    info!("Configuration loaded: endpoint={}, leave_host={}", config.cdp_endpoint, config.leave_host);

    let browser = CdpBrowserImpl::new(
        config.cdp_endpoint.clone(),
        CdpTimeoutConfig::with_default(config.command_timeout),
    );

    let version = browser.get_version().await.context("querying browser version")?;
    info!("Connected to {} (protocol {})", version.product, version.protocol_version);

    let session = CdpSession::open(&browser, config.start_url.as_deref())
        .await
        .context("opening page")?;
    let session = Arc::new(session);
    let current_url = session.current_url().await.context("reading page URL")?;
    info!("Tagging {}", current_url);

    let tagger = Tagger::new(
        session,
        TaggerOptions {
            current_url: Some(current_url),
            leave_host: config.leave_host,
        },
    );

    let snapshot = tagger.snapshot().await.context("tagging page")?;
    info!("Found {} distinct tags", snapshot.tag_count());
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser connections: {}", e);
    }

    Ok(())
}
