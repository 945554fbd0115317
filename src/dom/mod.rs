//! # DOM query helper
//!
//! Path-based element lookup on top of a [`BrowserSession`]. Queries are
//! typed [`ElementPath`] expressions; the session decides how to evaluate
//! them (XPath in the browser, structural matching in the mock).

pub mod path;

pub use path::{ElementPath, PathScope, PathStep};

use crate::session::{BrowserSession, ElementHandle};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Element lookup by path expression or by tag
#[derive(Debug, Clone)]
pub struct Dom {
    session: Arc<dyn BrowserSession>,
}

impl Dom {
    /// Create a query helper over a browser session
    pub fn new(session: Arc<dyn BrowserSession>) -> Self {
        Self { session }
    }

    /// Find every element matching `path`, in document order
    ///
    /// Relative paths are evaluated below `scope`; absolute paths ignore it.
    #[instrument(skip(self, scope), fields(path = %path))]
    pub async fn elements_by_path(
        &self,
        path: &ElementPath,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>> {
        let elements = self.session.find_elements(path, scope).await?;
        debug!("Path matched {} elements", elements.len());
        Ok(elements)
    }

    /// Re-resolve a tag produced by the tagger against the current DOM
    pub async fn element_by_tag(&self, tag: &str) -> Result<Option<ElementHandle>> {
        self.session.query_selector(tag).await
    }
}
