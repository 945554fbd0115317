//! Input kinds and form descriptors

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Borrow;
use std::ops::Index;

use crate::dom::{ElementPath, PathScope, PathStep};

/// Kind of form input to enumerate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Select,
    Checkbox,
    Date,
    /// Any other `type` attribute value
    Other(String),
}

impl InputKind {
    /// Kinds attached to every form, in order
    pub const FORM_KINDS: [InputKind; 4] = [
        InputKind::Text,
        InputKind::Select,
        InputKind::Checkbox,
        InputKind::Date,
    ];

    /// Parse an input type string; empty means "any input"
    pub fn parse(input_type: &str) -> Option<Self> {
        match input_type {
            "" => None,
            "text" => Some(InputKind::Text),
            "select" => Some(InputKind::Select),
            "checkbox" => Some(InputKind::Checkbox),
            "date" => Some(InputKind::Date),
            other => Some(InputKind::Other(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InputKind::Text => "text",
            InputKind::Select => "select",
            InputKind::Checkbox => "checkbox",
            InputKind::Date => "date",
            InputKind::Other(other) => other,
        }
    }

    /// Path matching inputs of this kind
    ///
    /// `select` is an element of its own; every other kind is an `input`
    /// with a matching `type` attribute.
    pub fn path(kind: Option<&InputKind>, scope: PathScope) -> ElementPath {
        let step = match kind {
            Some(InputKind::Select) => PathStep::new("select"),
            Some(kind) => PathStep::new("input").with_attribute("type", kind.as_str()),
            None => PathStep::new("input"),
        };

        match scope {
            PathScope::Absolute => ElementPath::absolute([step]),
            PathScope::Relative => ElementPath::relative([step]),
        }
    }
}

/// Input tags of one form, by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FormInputs {
    pub text: Vec<String>,
    pub select: Vec<String>,
    pub checkbox: Vec<String>,
    pub date: Vec<String>,
}

impl FormInputs {
    /// Slot for one of the form kinds
    pub(crate) fn slot_mut(&mut self, kind: &InputKind) -> Option<&mut Vec<String>> {
        match kind {
            InputKind::Text => Some(&mut self.text),
            InputKind::Select => Some(&mut self.select),
            InputKind::Checkbox => Some(&mut self.checkbox),
            InputKind::Date => Some(&mut self.date),
            InputKind::Other(_) => None,
        }
    }
}

/// Form tag to its inputs, in document order
///
/// Serializes as a JSON object whose keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormMap {
    entries: Vec<(String, FormInputs)>,
}

impl FormMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a form, replacing the inputs of an existing tag in place
    pub fn insert(&mut self, tag: String, inputs: FormInputs) -> Option<FormInputs> {
        match self.entries.iter_mut().find(|(key, _)| *key == tag) {
            Some((_, slot)) => Some(std::mem::replace(slot, inputs)),
            None => {
                self.entries.push((tag, inputs));
                None
            }
        }
    }

    pub fn get<Q>(&self, tag: &Q) -> Option<&FormInputs>
    where
        Q: PartialEq + ?Sized,
        String: Borrow<Q>,
    {
        self.entries
            .iter()
            .find(|(key, _)| <String as Borrow<Q>>::borrow(key) == tag)
            .map(|(_, inputs)| inputs)
    }

    pub fn contains_key<Q>(&self, tag: &Q) -> bool
    where
        Q: PartialEq + ?Sized,
        String: Borrow<Q>,
    {
        self.get(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Form tags in document order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormInputs)> {
        self.entries.iter().map(|(key, inputs)| (key, inputs))
    }
}

impl<Q> Index<&Q> for FormMap
where
    Q: PartialEq + ?Sized,
    String: Borrow<Q>,
{
    type Output = FormInputs;

    fn index(&self, tag: &Q) -> &FormInputs {
        match self.get(tag) {
            Some(inputs) => inputs,
            None => panic!("form tag not found"),
        }
    }
}

impl Serialize for FormMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tag, inputs) in &self.entries {
            map.serialize_entry(tag, inputs)?;
        }
        map.end()
    }
}
