//! Structural path expressions
//!
//! An [`ElementPath`] is an OR-list of simple steps ("every `a` inside a
//! `form`", "every `input` whose `type` is `submit`"), either over the whole
//! document or relative to a scope element. Drivers render it to XPath.

use std::fmt;

/// Where a path expression is evaluated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// Whole document
    Absolute,
    /// Descendants of a scope element
    Relative,
}

/// One alternative of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    /// Required ancestor element name
    pub ancestor: Option<String>,
    /// Element name to match
    pub tag: String,
    /// Required attribute value
    pub attribute: Option<(String, String)>,
}

impl PathStep {
    /// Match every element with the given name
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            ancestor: None,
            tag: tag.into(),
            attribute: None,
        }
    }

    /// Only match elements below an `ancestor` element
    pub fn within<S: Into<String>>(mut self, ancestor: S) -> Self {
        self.ancestor = Some(ancestor.into());
        self
    }

    /// Only match elements whose attribute `name` equals `value`
    pub fn with_attribute<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.attribute = Some((name.into(), value.into()));
        self
    }

    fn to_xpath(&self, scope: PathScope) -> String {
        let prefix = match scope {
            PathScope::Absolute => "//",
            PathScope::Relative => ".//",
        };

        let mut xpath = match &self.ancestor {
            Some(ancestor) => format!("{}{}//{}", prefix, ancestor, self.tag),
            None => format!("{}{}", prefix, self.tag),
        };

        if let Some((name, value)) = &self.attribute {
            xpath.push_str(&format!("[@{}={}]", name, xpath_literal(value)));
        }

        xpath
    }
}

/// An OR-combined structural path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    scope: PathScope,
    alternatives: Vec<PathStep>,
}

impl ElementPath {
    /// Path evaluated over the whole document
    pub fn absolute<I: IntoIterator<Item = PathStep>>(alternatives: I) -> Self {
        Self {
            scope: PathScope::Absolute,
            alternatives: alternatives.into_iter().collect(),
        }
    }

    /// Path evaluated over the descendants of a scope element
    pub fn relative<I: IntoIterator<Item = PathStep>>(alternatives: I) -> Self {
        Self {
            scope: PathScope::Relative,
            alternatives: alternatives.into_iter().collect(),
        }
    }

    /// Path scope
    pub fn scope(&self) -> PathScope {
        self.scope
    }

    /// OR-combined alternatives
    pub fn alternatives(&self) -> &[PathStep] {
        &self.alternatives
    }

    /// Render as an XPath union expression
    pub fn to_xpath(&self) -> String {
        self.alternatives
            .iter()
            .map(|step| step.to_xpath(self.scope))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

/// Quote a string as an XPath 1.0 literal
///
/// XPath 1.0 has no escape sequences, so a value containing both quote
/// kinds is split into a `concat()` call.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
