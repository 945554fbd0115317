//! CDP client implementation
//!
//! This module provides a high-level CDP client with typed methods for common operations.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    ///
    /// # Arguments
    /// * `connection` - CDP connection instance
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Parse remote object value to evaluation result
    pub fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            "number" => EvaluationResult::Number(obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0)),
            "boolean" => EvaluationResult::Bool(obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false)),
            "undefined" => EvaluationResult::Null,
            "object" if obj.subtype.as_deref() == Some("null") => EvaluationResult::Null,
            "object" | "function" | "bigint" | "symbol" => {
                EvaluationResult::Object(obj.value.clone().unwrap_or(serde_json::Value::Null))
            }
            other => {
                debug!("parse_remote_object: unknown type '{}', returning Null", other);
                EvaluationResult::Null
            }
        }
    }

    /// Decode a Runtime.evaluate / Runtime.callFunctionOn response, surfacing
    /// page-side exceptions as script failures
    fn decode_evaluation(result: serde_json::Value) -> Result<RemoteObject, Error> {
        let response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse evaluation response: {}", e)))?;

        if let Some(exception) = response.exception_details {
            return Err(Error::script_execution_failed(exception.message()));
        }

        Ok(response.result)
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        info!("Navigating to {}", url);

        let params = NavigateParams {
            url: url.to_string(),
            referrer: None,
        };

        let result = self
            .call_method("Page.navigate", serde_json::to_value(params)?)
            .await?;

        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            return Err(Error::navigation_failed(format!("{}: {}", url, error_text)));
        }

        // Poll document.readyState; load events race with the navigate reply.
        let max_attempts = 50;
        let mut is_loaded = false;

        for attempt in 0..max_attempts {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            match self.evaluate("document.readyState", false).await {
                Ok(EvaluationResult::String(state)) if state == "complete" => {
                    debug!("Page loaded on attempt {}", attempt + 1);
                    is_loaded = true;
                    break;
                }
                Ok(state) => {
                    debug!("Document ready state on attempt {}: {:?}", attempt + 1, state);
                }
                Err(e) => {
                    debug!("Error checking ready state on attempt {}: {}", attempt + 1, e);
                }
            }
        }

        if !is_loaded {
            info!("Page load polling timeout - continuing anyway");
        }

        let final_url = match self.evaluate("document.location.href", false).await {
            Ok(EvaluationResult::String(href)) => href,
            _ => url.to_string(),
        };

        Ok(NavigationResult {
            loader_id: result
                .get("loaderId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            url: final_url,
            is_loaded,
        })
    }

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        debug!("Evaluating script: {}", script);

        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        let remote_obj = Self::decode_evaluation(result)?;
        Ok(Self::parse_remote_object(&remote_obj))
    }

    async fn evaluate_handle(&self, script: &str) -> Result<RemoteObject, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(false),
            return_by_value: Some(false),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        Self::decode_evaluation(result)
    }

    async fn call_function_on(
        &self,
        object_id: &str,
        function_declaration: &str,
        arguments: Vec<CallArgument>,
        return_by_value: bool,
    ) -> Result<RemoteObject, Error> {
        let params = CallFunctionOnParams {
            function_declaration: function_declaration.to_string(),
            object_id: object_id.to_string(),
            arguments,
            return_by_value,
            await_promise: false,
        };

        let result = self
            .call_method("Runtime.callFunctionOn", serde_json::to_value(params)?)
            .await?;

        Self::decode_evaluation(result)
    }

    async fn get_properties(&self, object_id: &str) -> Result<Vec<PropertyDescriptor>, Error> {
        let result = self
            .call_method(
                "Runtime.getProperties",
                serde_json::json!({
                    "objectId": object_id,
                    "ownProperties": true,
                }),
            )
            .await?;

        let response: GetPropertiesResponse = serde_json::from_value(result)?;
        Ok(response.result)
    }

    async fn release_object(&self, object_id: &str) -> Result<(), Error> {
        self.call_method("Runtime.releaseObject", serde_json::json!({ "objectId": object_id }))
            .await?;
        Ok(())
    }

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        info!("Enabling domain: {}", domain);

        let method = format!("{}.enable", domain);
        self.call_method(&method, serde_json::json!({})).await?;

        Ok(())
    }

    /// Call a raw CDP method
    async fn call_method(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;

        response.result.ok_or_else(|| Error::cdp("No result in response"))
    }
}
