//! Configuration management for oxide-tagger

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Tagger configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// DevTools endpoint of the browser (e.g. "ws://localhost:9222")
    pub cdp_endpoint: String,

    /// Page to open before tagging. When unset the first open page target is used.
    pub start_url: Option<String>,

    /// Whether links to other hosts count as clickable
    pub leave_host: bool,

    /// Default timeout for CDP commands in milliseconds
    pub command_timeout: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cdp_endpoint: "ws://localhost:9222".to_string(),
            start_url: None,
            leave_host: false,
            command_timeout: 30000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `TAGGER_CONFIG` names a TOML file used as the base; the other
    /// variables override individual fields.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var("TAGGER_CONFIG") {
            Ok(path) => Config::from_file(&path)?,
            Err(_) => Config::default(),
        };

        if let Ok(endpoint) = env::var("TAGGER_CDP_ENDPOINT") {
            config.cdp_endpoint = endpoint;
        }

        if let Ok(url) = env::var("TAGGER_START_URL") {
            config.start_url = Some(url);
        }

        if let Ok(leave_host) = env::var("TAGGER_LEAVE_HOST") {
            config.leave_host = leave_host
                .parse()
                .map_err(|_| Error::configuration("Invalid TAGGER_LEAVE_HOST"))?;
        }

        if let Ok(timeout) = env::var("TAGGER_COMMAND_TIMEOUT") {
            config.command_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid TAGGER_COMMAND_TIMEOUT"))?;
        }

        if let Ok(log_level) = env::var("TAGGER_LOG_LEVEL") {
            config.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.cdp_endpoint.starts_with("ws://")
            || self.cdp_endpoint.starts_with("wss://")
            || self.cdp_endpoint.starts_with("http://")
            || self.cdp_endpoint.starts_with("https://"))
        {
            return Err(Error::configuration(format!(
                "Unsupported CDP endpoint scheme: {}",
                self.cdp_endpoint
            )));
        }

        if self.command_timeout == 0 {
            return Err(Error::configuration("command_timeout must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cdp_endpoint, "ws://localhost:9222");
        assert!(!config.leave_host);
        assert!(config.start_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml_str(
            r#"
            start_url = "https://example.com/search"
            leave_host = true
            "#,
        )
        .unwrap();

        assert_eq!(config.start_url.as_deref(), Some("https://example.com/search"));
        assert!(config.leave_host);
        assert_eq!(config.command_timeout, 30000);
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let err = Config::from_toml_str(r#"cdp_endpoint = "ftp://localhost:9222""#).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = Config::from_toml_str("command_timeout = 0").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
