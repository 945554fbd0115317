//! # Browser session layer
//!
//! The driver contract the tagger runs against, with two implementations:
//! a live Chromium page over CDP and an in-memory document for tests.
//!
//! ## Module layout
//! - `traits`: the [`BrowserSession`] contract and [`ScriptValue`]
//! - `element`: opaque [`ElementHandle`] references
//! - `cdp_session`: [`CdpSession`], backed by a [`crate::cdp::CdpClient`]
//! - `mock`: [`MockSession`] over a [`MockDom`]
//!
//! ## Example
//! ```rust,no_run
//! use oxide_tagger::cdp::{CdpBrowser, CdpBrowserImpl, CdpTimeoutConfig};
//! use oxide_tagger::session::{BrowserSession, CdpSession};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let browser = CdpBrowserImpl::new("ws://localhost:9222", CdpTimeoutConfig::default());
//! let target = browser.create_target("https://example.com").await?;
//! let client = browser.create_client(&target).await?;
//!
//! let session = CdpSession::new(client);
//! println!("Page: {}", session.current_url().await?);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod element;
pub mod cdp_session;
pub mod mock;

pub use traits::{BrowserSession, ScriptValue};
pub use element::ElementHandle;
pub use cdp_session::CdpSession;
pub use mock::{MockDom, MockSession, NodeId};
