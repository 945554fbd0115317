//! CDP browser control implementation
//!
//! This module provides browser-level operations via the DevTools HTTP endpoint.

use super::client::CdpClientImpl;
use super::connection::{CdpTimeoutConfig, CdpWebSocketConnection};
use super::traits::*;
use crate::Error;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CDP browser implementation
#[derive(Debug)]
pub struct CdpBrowserImpl {
    /// Browser endpoint (e.g., "ws://localhost:9222")
    endpoint: String,
    /// Timeouts applied to every connection opened through this browser
    timeout_config: CdpTimeoutConfig,
    /// HTTP client for the /json endpoints
    http: reqwest::Client,
    /// Active connections (target_id -> connection)
    connections: tokio::sync::Mutex<HashMap<String, Arc<dyn CdpConnection>>>,
}

impl CdpBrowserImpl {
    /// Create a new CDP browser controller
    ///
    /// # Arguments
    /// * `endpoint` - Browser endpoint (e.g., "ws://localhost:9222")
    /// * `timeout_config` - Per-command timeouts for page connections
    pub fn new<S: Into<String>>(endpoint: S, timeout_config: CdpTimeoutConfig) -> Self {
        let endpoint = endpoint.into();
        info!("Creating CDP browser controller for endpoint: {}", endpoint);
        Self {
            endpoint,
            timeout_config,
            http: reqwest::Client::new(),
            connections: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// HTTP base URL of the DevTools endpoint
    fn http_endpoint(&self) -> String {
        self.endpoint
            .trim_end_matches('/')
            .replace("ws://", "http://")
            .replace("wss://", "https://")
    }

    /// Convert one entry of the /json listing
    fn parse_target(target_json: &serde_json::Value) -> Option<TargetInfo> {
        let target_id = target_json.get("id").and_then(|v| v.as_str())?;
        let target_type = target_json.get("type").and_then(|v| v.as_str())?;
        let url = target_json.get("url").and_then(|v| v.as_str())?;

        Some(TargetInfo {
            target_id: target_id.to_string(),
            target_type: target_type.to_string(),
            title: target_json
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            url: url.to_string(),
            ws_url: target_json
                .get("webSocketDebuggerUrl")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}

#[async_trait]
impl CdpBrowser for CdpBrowserImpl {
    async fn create_client(&self, target_url: &str) -> Result<Arc<dyn CdpClient>, Error> {
        info!("Creating CDP client for target: {}", target_url);

        let connection = CdpWebSocketConnection::new(target_url, self.timeout_config.clone()).await?;

        let target_id = target_url
            .rsplit('/')
            .next()
            .unwrap_or("unknown")
            .to_string();

        self.connections
            .lock()
            .await
            .insert(target_id, Arc::clone(&connection) as Arc<dyn CdpConnection>);

        let client = Arc::new(CdpClientImpl::new(connection));

        client.enable_domain("Page").await?;
        client.enable_domain("Runtime").await?;

        Ok(client)
    }

    async fn close(&self) -> Result<(), Error> {
        let mut connections = self.connections.lock().await;

        for (target_id, connection) in connections.iter() {
            debug!("Closing connection to target: {}", target_id);
            if let Err(e) = connection.close().await {
                warn!("Failed to close connection to {}: {}", target_id, e);
            }
        }

        connections.clear();
        Ok(())
    }

    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        let url = format!("{}/json/version", self.http_endpoint());
        debug!("Fetching browser version from {}", url);

        let version_json: serde_json::Value = self.http.get(&url).send().await?.json().await?;

        let field = |name: &str| {
            version_json
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string()
        };

        Ok(BrowserVersion {
            protocol_version: field("Protocol-Version"),
            product: field("Browser"),
            user_agent: field("User-Agent"),
        })
    }

    async fn get_targets(&self) -> Result<Vec<TargetInfo>, Error> {
        let url = format!("{}/json", self.http_endpoint());
        debug!("Fetching targets from {}", url);

        let targets_json: Vec<serde_json::Value> = self.http.get(&url).send().await?.json().await?;

        Ok(targets_json.iter().filter_map(Self::parse_target).collect())
    }

    /// Uses the /json/new endpoint, which creates a page and returns its
    /// WebSocket URL directly.
    async fn create_target(&self, url: &str) -> Result<String, Error> {
        info!("Creating new target with URL: {}", url);

        let new_url = format!("{}/json/new?{}", self.http_endpoint(), urlencoding::encode(url));

        let response = self.http.put(&new_url).send().await.map_err(|e| {
            Error::target_not_found(format!(
                "Failed to reach DevTools endpoint at {} (start Chrome with --remote-debugging-port=9222): {}",
                self.endpoint, e
            ))
        })?;

        let target_json: serde_json::Value = response.json().await?;

        Self::parse_target(&target_json)
            .and_then(|target| target.ws_url)
            .ok_or_else(|| Error::target_not_found("No webSocketDebuggerUrl in new target response"))
    }
}
