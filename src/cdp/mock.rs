//! Mock CDP implementation for testing
//!
//! A scripted connection: responses are queued per method and every command
//! sent is recorded so tests can assert on the wire traffic.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::cdp::traits::*;
use crate::Error;

/// Mock CDP connection
#[derive(Debug)]
pub struct MockCdpConnection {
    is_active: AtomicBool,
    next_id: AtomicU64,
    responses: Mutex<HashMap<String, VecDeque<serde_json::Value>>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Self {
        Self {
            is_active: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a result for the next call of `method`
    pub async fn push_response(&self, method: &str, result: serde_json::Value) {
        self.responses
            .lock()
            .await
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    /// Queue a protocol error for the next call of `method`
    pub async fn push_error(&self, method: &str, message: &str) {
        self.push_response(method, serde_json::json!({ "__error": message }))
            .await;
    }

    /// All commands sent so far, in order
    pub async fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().await.clone()
    }

    /// Commands sent so far for one method
    pub async fn calls_to(&self, method: &str) -> Vec<serde_json::Value> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

impl Default for MockCdpConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::cdp("Connection is closed"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.calls.lock().await.push((method.to_string(), params));

        let queued = self
            .responses
            .lock()
            .await
            .get_mut(method)
            .and_then(|queue| queue.pop_front());

        if let Some(message) = queued
            .as_ref()
            .and_then(|r| r.get("__error"))
            .and_then(|m| m.as_str())
        {
            return Err(Error::cdp(format!("{}: {} (code: -32000)", method, message)));
        }

        Ok(CdpResponse {
            id,
            result: Some(queued.unwrap_or_else(|| serde_json::json!({}))),
            error: None,
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_responses_in_order() {
        let connection = MockCdpConnection::new();
        connection.push_response("Runtime.evaluate", serde_json::json!({ "n": 1 })).await;
        connection.push_response("Runtime.evaluate", serde_json::json!({ "n": 2 })).await;

        let first = connection.send_command("Runtime.evaluate", serde_json::json!({})).await.unwrap();
        let second = connection.send_command("Runtime.evaluate", serde_json::json!({})).await.unwrap();
        let third = connection.send_command("Runtime.evaluate", serde_json::json!({})).await.unwrap();

        assert_eq!(first.result.unwrap()["n"], 1);
        assert_eq!(second.result.unwrap()["n"], 2);
        assert_eq!(third.result.unwrap(), serde_json::json!({}));
        assert_eq!(connection.calls_to("Runtime.evaluate").await.len(), 3);
    }

    #[tokio::test]
    async fn test_closed_connection_rejects_commands() {
        let connection = MockCdpConnection::new();
        connection.close().await.unwrap();
        assert!(!connection.is_active());
        assert!(connection.send_command("Page.enable", serde_json::json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_queued_error() {
        let connection = MockCdpConnection::new();
        connection
            .push_error("Runtime.callFunctionOn", "Could not find object with given id")
            .await;

        let err = connection
            .send_command("Runtime.callFunctionOn", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Could not find object"));
    }
}
