//! Oxide-Tagger: stateless element tagging for browser automation
//!
//! This library computes positional tags for the elements of a live page
//! and enumerates clickables, buttons, inputs and forms, driving Chromium
//! over the Chrome DevTools Protocol.

pub mod error;
pub mod config;

pub mod cdp;
pub mod dom;
pub mod session;
pub mod tagger;

// Re-exports
pub use error::{Error, Result};
pub use tagger::{FormInputs, FormMap, InputKind, PageSnapshot, Tagger, TaggerOptions};

/// Oxide-Tagger library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
