//! Browser session over the Chrome DevTools Protocol
//!
//! Element handles are Runtime remote object ids. Queries run in the page
//! and return arrays by reference, which are unpacked with
//! Runtime.getProperties.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cdp::client::CdpClientImpl;
use crate::cdp::traits::{CdpBrowser, CdpClient};
use crate::cdp::types::{CallArgument, RemoteObject};
use crate::dom::{ElementPath, PathScope};
use crate::session::element::ElementHandle;
use crate::session::traits::{BrowserSession, ScriptValue};
use crate::Error;

/// Evaluates an XPath against `this` (or the document) into an array of nodes
const FIND_ELEMENTS_FN: &str = r#"function(xpath) {
    const context = (this && this.nodeType) ? this : document;
    const snapshot = document.evaluate(xpath, context, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
    const nodes = [];
    for (let i = 0; i < snapshot.snapshotLength; i++) {
        nodes.push(snapshot.snapshotItem(i));
    }
    return nodes;
}"#;

const IS_DISPLAYED_FN: &str = r#"function() {
    if (!this.isConnected) {
        return false;
    }
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden') {
        return false;
    }
    return this.getClientRects().length > 0;
}"#;

/// `:disabled` covers inheritance from a disabled fieldset or optgroup
const IS_ENABLED_FN: &str = "function() { return !(this.matches && this.matches(':disabled')); }";

const GET_ATTRIBUTE_FN: &str = "function(name) { return this.getAttribute ? this.getAttribute(name) : null; }";

const BLANK_PAGE: &str = "about:blank";

/// Browser session backed by a CDP page client
#[derive(Debug, Clone)]
pub struct CdpSession {
    client: Arc<dyn CdpClient>,
}

impl CdpSession {
    /// Create a session over a connected page client
    pub fn new(client: Arc<dyn CdpClient>) -> Self {
        Self { client }
    }

    /// Open a session on a page of `browser`
    ///
    /// With a start URL a blank page is created and navigated once; without
    /// one the first attachable page is used as is.
    pub async fn open(browser: &dyn CdpBrowser, start_url: Option<&str>) -> Result<Self, Error> {
        let ws_url = match start_url {
            Some(_) => browser.create_target(BLANK_PAGE).await?,
            None => browser
                .get_targets()
                .await?
                .into_iter()
                .find(|target| target.is_attachable_page())
                .and_then(|target| target.ws_url)
                .ok_or_else(|| Error::target_not_found("no open page to attach to"))?,
        };

        let client = browser.create_client(&ws_url).await?;

        if let Some(url) = start_url {
            let result = client.navigate(url).await?;
            if !result.is_loaded {
                warn!("Page {} did not finish loading", result.url);
            }
        }

        Ok(Self::new(client))
    }

    /// Underlying CDP client
    pub fn client(&self) -> Arc<dyn CdpClient> {
        Arc::clone(&self.client)
    }

    /// Call a function on an element and return its result by value
    async fn call_on_element(
        &self,
        element: &ElementHandle,
        function_declaration: &str,
        arguments: Vec<CallArgument>,
    ) -> Result<ScriptValue, Error> {
        let result = self
            .client
            .call_function_on(element.object_id(), function_declaration, arguments, true)
            .await?;
        Ok(CdpClientImpl::parse_remote_object(&result).into())
    }

    /// Convert a remote node reference into a handle
    fn handle_from_remote(object: &RemoteObject) -> Option<ElementHandle> {
        if object.is_nullish() {
            return None;
        }
        let object_id = object.object_id.as_deref()?;
        let description = object.description.as_deref().unwrap_or("node");
        Some(ElementHandle::new(object_id, description))
    }

    /// Unpack a remote array of nodes into handles, preserving order
    async fn collect_nodes(&self, array: RemoteObject) -> Result<Vec<ElementHandle>, Error> {
        let array_id = array
            .object_id
            .ok_or_else(|| Error::cdp("Element query did not return an array reference"))?;

        let properties = self.client.get_properties(&array_id).await;

        if let Err(e) = self.client.release_object(&array_id).await {
            warn!("Failed to release query result {}: {}", array_id, e);
        }

        let mut indexed: Vec<(usize, ElementHandle)> = properties?
            .iter()
            .filter_map(|property| {
                let index = property.name.parse::<usize>().ok()?;
                let handle = Self::handle_from_remote(property.value.as_ref()?)?;
                Some((index, handle))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);

        Ok(indexed.into_iter().map(|(_, handle)| handle).collect())
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn execute_script(&self, script: &str, element: &ElementHandle) -> Result<ScriptValue, Error> {
        let function_declaration = format!("function() {{{}}}", script);
        self.call_on_element(
            element,
            &function_declaration,
            vec![CallArgument::object(element.object_id())],
        )
        .await
    }

    async fn find_elements(
        &self,
        path: &ElementPath,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, Error> {
        let xpath = path.to_xpath();
        debug!("Finding elements by XPath: {}", xpath);

        let array = match (path.scope(), scope) {
            (PathScope::Relative, Some(scope)) => {
                self.client
                    .call_function_on(
                        scope.object_id(),
                        FIND_ELEMENTS_FN,
                        vec![CallArgument::value(xpath)],
                        false,
                    )
                    .await?
            }
            _ => {
                let expression = format!(
                    "({}).call(document, {})",
                    FIND_ELEMENTS_FN,
                    serde_json::to_string(&xpath)?
                );
                self.client.evaluate_handle(&expression).await?
            }
        };

        self.collect_nodes(array).await
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, Error> {
        let expression = format!("document.querySelector({})", serde_json::to_string(selector)?);
        let object = self.client.evaluate_handle(&expression).await?;
        Ok(Self::handle_from_remote(&object))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, Error> {
        let value = self.call_on_element(element, IS_DISPLAYED_FN, vec![]).await?;
        Ok(matches!(value, ScriptValue::Bool(true)))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, Error> {
        let value = self.call_on_element(element, IS_ENABLED_FN, vec![]).await?;
        Ok(!matches!(value, ScriptValue::Bool(false)))
    }

    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, Error> {
        let value = self
            .call_on_element(element, GET_ATTRIBUTE_FN, vec![CallArgument::value(name)])
            .await?;
        Ok(value.into_string())
    }

    async fn release(&self, element: &ElementHandle) -> Result<(), Error> {
        self.client.release_object(element.object_id()).await
    }

    async fn current_url(&self) -> Result<String, Error> {
        let value = self.client.evaluate("document.location.href", false).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::script_execution_failed("document.location.href is not a string"))
    }
}
