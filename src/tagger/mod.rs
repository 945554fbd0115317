//! # Element tagger
//!
//! Computes positional tags (`html:nth-of-type(1) > body:nth-of-type(1) > ...`)
//! for elements of a live page and enumerates the tagged elements a crawler
//! cares about: clickables, buttons, form inputs and forms.
//!
//! Tags are derived from the current DOM on every call and are only valid
//! for that snapshot of the page.
//!
//! ## Example
//! ```rust,no_run
//! use oxide_tagger::session::{MockDom, MockSession};
//! use oxide_tagger::tagger::{Tagger, TaggerOptions};
//! use std::sync::Arc;
//!
//! # async fn example() -> oxide_tagger::Result<()> {
//! let mut dom = MockDom::new();
//! let body = dom.body();
//! dom.append_element_with(body, "a", &[("href", "/about")]);
//!
//! let tagger = Tagger::new(Arc::new(MockSession::new(dom)), TaggerOptions::default());
//! for tag in tagger.get_clickable().await? {
//!     println!("{}", tag);
//! }
//! # Ok(())
//! # }
//! ```

pub mod forms;
pub mod script;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use forms::{FormInputs, FormMap, InputKind};
pub use snapshot::PageSnapshot;

use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::dom::{Dom, ElementPath, PathScope, PathStep};
use crate::session::{BrowserSession, ElementHandle};
use crate::Result;
use script::ELEMENT_PATH_SCRIPT;

/// Tagger options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggerOptions {
    /// URL of the page being tagged, used to judge off-host links
    pub current_url: Option<String>,
    /// Whether links to other hosts count as clickable
    pub leave_host: bool,
}

/// Element tagger over a browser session
#[derive(Debug, Clone)]
pub struct Tagger {
    session: Arc<dyn BrowserSession>,
    dom: Dom,
    options: TaggerOptions,
}

impl Tagger {
    /// Create a tagger
    pub fn new(session: Arc<dyn BrowserSession>, options: TaggerOptions) -> Self {
        let dom = Dom::new(Arc::clone(&session));
        Self { session, dom, options }
    }

    pub fn options(&self) -> &TaggerOptions {
        &self.options
    }

    /// Update the URL links are judged against, e.g. after navigation
    pub fn set_current_url<S: Into<String>>(&mut self, url: S) {
        self.options.current_url = Some(url.into());
    }

    /// Compute the positional tag of an element
    ///
    /// Returns `None` when the node is not an element.
    pub async fn tag_from_element(&self, element: &ElementHandle) -> Result<Option<String>> {
        let value = self.session.execute_script(ELEMENT_PATH_SCRIPT, element).await?;
        Ok(value.into_string())
    }

    /// Re-resolve a tag against the current DOM
    ///
    /// The caller owns the returned handle.
    pub async fn element_by_tag(&self, tag: &str) -> Result<Option<ElementHandle>> {
        self.dom.element_by_tag(tag).await
    }

    /// Whether an element is worth clicking
    ///
    /// Only an element that is neither displayed nor enabled is rejected
    /// outright; everything else goes through [`Self::base_clickable_check`].
    pub async fn clickable_sanity_check(&self, element: &ElementHandle) -> Result<bool> {
        if !self.session.is_displayed(element).await? && !self.session.is_enabled(element).await? {
            debug!("Skipping non-displayed: {}", element);
            return Ok(false);
        }

        self.base_clickable_check(element).await
    }

    /// Link checks shared by every clickable
    pub async fn base_clickable_check(&self, element: &ElementHandle) -> Result<bool> {
        let Some(href) = self.session.get_attribute(element, "href").await? else {
            return Ok(true);
        };
        let href = href.trim();

        let lower = href.to_ascii_lowercase();
        if lower.starts_with("mailto:") || lower.starts_with("tel:") {
            debug!("Skipping non-navigable link {}: {}", element, href);
            return Ok(false);
        }

        if self.options.leave_host {
            return Ok(true);
        }

        let Some(base) = self
            .options
            .current_url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
        else {
            return Ok(true);
        };

        match base.join(href) {
            Ok(target)
                if matches!(target.scheme(), "http" | "https")
                    && target.host_str() != base.host_str() =>
            {
                debug!("Skipping off-host link {}: {}", element, target);
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Tags of every clickable element
    #[instrument(skip(self))]
    pub async fn get_clickable(&self) -> Result<Vec<String>> {
        let path = ElementPath::absolute([
            PathStep::new("a"),
            PathStep::new("button"),
            PathStep::new("input").with_attribute("type", "submit"),
            PathStep::new("input").with_attribute("type", "button"),
        ]);
        self.clickable_tags(&path).await
    }

    async fn clickable_tags(&self, path: &ElementPath) -> Result<Vec<String>> {
        let elements = self.dom.elements_by_path(path, None).await?;
        let tags = self.tag_clickables(&elements).await;
        self.release_all(&elements).await;
        tags
    }

    async fn tag_clickables(&self, elements: &[ElementHandle]) -> Result<Vec<String>> {
        let mut tags = Vec::new();
        for element in elements {
            if !self.clickable_sanity_check(element).await? {
                continue;
            }
            match self.tag_from_element(element).await? {
                Some(tag) => tags.push(tag),
                None => warn!("No tag for element {}", element),
            }
        }
        Ok(tags)
    }

    /// Tags of input elements, optionally within a form and of one type
    ///
    /// `"select"` matches `select` elements; any other non-empty type
    /// matches `input` elements with that `type` attribute.
    pub async fn get_inputs(&self, form: Option<&ElementHandle>, input_type: Option<&str>) -> Result<Vec<String>> {
        let kind = input_type.and_then(InputKind::parse);
        self.inputs_of_kind(form, kind.as_ref()).await
    }

    async fn inputs_of_kind(&self, form: Option<&ElementHandle>, kind: Option<&InputKind>) -> Result<Vec<String>> {
        let scope = match form {
            Some(_) => PathScope::Relative,
            None => PathScope::Absolute,
        };
        let path = InputKind::path(kind, scope);

        let elements = self.dom.elements_by_path(&path, form).await?;
        let tags = self.tag_inputs(&elements).await;
        self.release_all(&elements).await;
        tags
    }

    async fn tag_inputs(&self, elements: &[ElementHandle]) -> Result<Vec<String>> {
        let mut tags = Vec::new();
        for element in elements {
            match self.tag_from_element(element).await? {
                Some(tag) => tags.push(tag),
                None => warn!("No tag for input {}", element),
            }
        }
        Ok(tags)
    }

    /// Displayed and enabled forms with their inputs, in document order
    #[instrument(skip(self))]
    pub async fn get_forms(&self) -> Result<FormMap> {
        let path = ElementPath::absolute([PathStep::new("form")]);

        let elements = self.dom.elements_by_path(&path, None).await?;
        let forms = self.describe_forms(&elements).await;
        self.release_all(&elements).await;
        forms
    }

    async fn describe_forms(&self, elements: &[ElementHandle]) -> Result<FormMap> {
        let mut forms = FormMap::new();
        for form in elements {
            if !self.is_interactable(form).await? {
                debug!("Skipping form {}", form);
                continue;
            }

            let Some(tag) = self.tag_from_element(form).await? else {
                warn!("No tag for form {}", form);
                continue;
            };

            let mut inputs = FormInputs::default();
            for kind in &InputKind::FORM_KINDS {
                let tags = self.inputs_of_kind(Some(form), Some(kind)).await?;
                if let Some(slot) = inputs.slot_mut(kind) {
                    *slot = tags;
                }
            }
            forms.insert(tag, inputs);
        }

        Ok(forms)
    }

    /// Tags of displayed and enabled buttons, in document order
    #[instrument(skip(self))]
    pub async fn get_buttons(&self) -> Result<Vec<String>> {
        let path = ElementPath::absolute([
            PathStep::new("a").within("form"),
            PathStep::new("button"),
            PathStep::new("input").with_attribute("type", "button"),
            PathStep::new("input").with_attribute("type", "submit"),
            PathStep::new("a").within("table"),
        ]);

        let elements = self.dom.elements_by_path(&path, None).await?;
        let tags = self.tag_buttons(&elements).await;
        self.release_all(&elements).await;
        tags
    }

    async fn tag_buttons(&self, elements: &[ElementHandle]) -> Result<Vec<String>> {
        let mut tags = Vec::new();
        for element in elements {
            if !self.is_interactable(element).await? {
                continue;
            }
            match self.tag_from_element(element).await? {
                Some(tag) => tags.push(tag),
                None => warn!("No tag for button {}", element),
            }
        }
        Ok(tags)
    }

    /// Release the handles an enumeration queried, whatever its outcome
    async fn release_all(&self, elements: &[ElementHandle]) {
        for element in elements {
            if let Err(e) = self.session.release(element).await {
                warn!("Failed to release {}: {}", element, e);
            }
        }
    }

    /// Everything above for the current page
    pub async fn snapshot(&self) -> Result<PageSnapshot> {
        Ok(PageSnapshot {
            url: self.session.current_url().await?,
            clickable: self.get_clickable().await?,
            buttons: self.get_buttons().await?,
            inputs: self.get_inputs(None, None).await?,
            forms: self.get_forms().await?,
        })
    }

    async fn is_interactable(&self, element: &ElementHandle) -> Result<bool> {
        Ok(self.session.is_displayed(element).await? && self.session.is_enabled(element).await?)
    }
}
