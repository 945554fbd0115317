//! Element handles
//!
//! Opaque references to DOM nodes owned by a browser session.

use std::fmt;

/// Reference to a DOM node in the page
///
/// Valid only for the page state it was obtained from; the session reports
/// a stale handle as an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    object_id: String,
    description: String,
}

impl ElementHandle {
    /// Create a new element handle
    pub fn new<I: Into<String>, D: Into<String>>(object_id: I, description: D) -> Self {
        Self {
            object_id: object_id.into(),
            description: description.into(),
        }
    }

    /// Session-specific object id
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Short description of the node (e.g. "input#q.search")
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.object_id)
    }
}
