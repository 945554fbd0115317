//! Serializable view of a tagged page

use serde::Serialize;

use super::forms::FormMap;

/// Everything the tagger enumerates on one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub url: String,
    pub clickable: Vec<String>,
    pub buttons: Vec<String>,
    pub inputs: Vec<String>,
    pub forms: FormMap,
}

impl PageSnapshot {
    /// Number of distinct tags across all categories
    pub fn tag_count(&self) -> usize {
        let mut tags: Vec<&String> = self
            .clickable
            .iter()
            .chain(&self.buttons)
            .chain(&self.inputs)
            .chain(self.forms.keys())
            .collect();
        tags.sort();
        tags.dedup();
        tags.len()
    }
}
