//! Browser session traits
//!
//! This module defines the driver contract the tagger is written against.

use async_trait::async_trait;

use super::element::ElementHandle;
use crate::dom::ElementPath;

/// Result of a script executed in the page
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Object(serde_json::Value),
}

impl ScriptValue {
    /// Take the string value, if this is one
    pub fn into_string(self) -> Option<String> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<crate::cdp::EvaluationResult> for ScriptValue {
    fn from(result: crate::cdp::EvaluationResult) -> Self {
        match result {
            crate::cdp::EvaluationResult::String(s) => ScriptValue::String(s),
            crate::cdp::EvaluationResult::Number(n) => ScriptValue::Number(n),
            crate::cdp::EvaluationResult::Bool(b) => ScriptValue::Bool(b),
            crate::cdp::EvaluationResult::Null => ScriptValue::Null,
            crate::cdp::EvaluationResult::Object(v) => ScriptValue::Object(v),
        }
    }
}

/// Browser session trait
///
/// A live page driven by an automation driver. Every call reads the current
/// DOM; nothing is cached between calls.
#[async_trait]
pub trait BrowserSession: Send + Sync + std::fmt::Debug {
    /// Execute a script body with `element` bound to `arguments[0]`
    async fn execute_script(&self, script: &str, element: &ElementHandle) -> Result<ScriptValue, crate::Error>;

    /// Find elements matching a path expression, in document order
    ///
    /// Relative paths are evaluated below `scope` (or the document when no
    /// scope is given); absolute paths always start at the document.
    async fn find_elements(
        &self,
        path: &ElementPath,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, crate::Error>;

    /// Find the first element matching a CSS selector
    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, crate::Error>;

    /// Check if element is displayed
    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, crate::Error>;

    /// Check if element is enabled
    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, crate::Error>;

    /// Get element attribute
    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, crate::Error>;

    /// Drop the driver-side reference behind a handle
    ///
    /// The handle must not be used afterwards. Drivers without remote
    /// references have nothing to release.
    async fn release(&self, _element: &ElementHandle) -> Result<(), crate::Error> {
        Ok(())
    }

    /// URL of the current document
    async fn current_url(&self) -> Result<String, crate::Error>;
}
