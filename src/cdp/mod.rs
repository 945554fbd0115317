//! # Chrome DevTools Protocol (CDP) layer
//!
//! WebSocket transport to a Chromium page target, plus the DevTools HTTP
//! endpoint used to discover and create targets.
//!
//! ## Module structure
//! - `traits`: connection, client and browser traits
//! - `types`: JSON-RPC and Runtime domain payloads
//! - `connection`: WebSocket connection with per-command timeouts
//! - `client`: typed Page / Runtime calls
//! - `browser`: `/json` endpoint access
//! - `mock`: scripted connection for tests
//!
//! ## Example
//! ```rust,no_run
//! use oxide_tagger::cdp::{CdpBrowser, CdpBrowserImpl, CdpTimeoutConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let browser = CdpBrowserImpl::new("ws://localhost:9222", CdpTimeoutConfig::default());
//! let ws_url = browser.create_target("https://example.com").await?;
//! let client = browser.create_client(&ws_url).await?;
//! let result = client.navigate("https://example.com").await?;
//! println!("Navigated to: {}", result.url);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod browser;
pub mod mock;

pub use traits::{
    CdpConnection, CdpClient, CdpBrowser, CdpResponse, CdpError,
    NavigationResult, EvaluationResult, BrowserVersion, TargetInfo,
};

pub use connection::{CdpWebSocketConnection, CdpTimeoutConfig};
pub use client::CdpClientImpl;
pub use browser::CdpBrowserImpl;

pub use mock::MockCdpConnection;
