//! Mock session implementation for testing
//!
//! [`MockDom`] is a small in-memory document; [`MockSession`] drives it the
//! way a browser driver would, including native evaluation of the tagger's
//! path script. Other scripts are rejected.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::element::ElementHandle;
use super::traits::{BrowserSession, ScriptValue};
use crate::dom::{ElementPath, PathScope, PathStep};
use crate::tagger::script::{parse_tag_level, ELEMENT_PATH_SCRIPT, TAG_SEPARATOR};
use crate::Error;

/// Elements the `disabled` attribute applies to
const FORM_CONTROLS: [&str; 7] = ["button", "input", "select", "textarea", "optgroup", "option", "fieldset"];

/// Index of a node in a [`MockDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        hidden: bool,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct MockNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document
///
/// Starts as `<html><head></head><body></body></html>`. The `html` element
/// is the document element; a node is attached while its parent chain
/// reaches it.
#[derive(Debug, Clone)]
pub struct MockDom {
    nodes: Vec<MockNode>,
    url: String,
}

impl MockDom {
    /// Create an empty page
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: vec![MockNode {
                kind: NodeKind::Element {
                    name: "html".to_string(),
                    attributes: Vec::new(),
                    hidden: false,
                },
                parent: None,
                children: Vec::new(),
            }],
            url: "about:blank".to_string(),
        };
        let html = dom.html();
        dom.append_element(html, "head");
        dom.append_element(html, "body");
        dom
    }

    /// The `html` element
    pub fn html(&self) -> NodeId {
        NodeId(0)
    }

    /// The `head` element
    pub fn head(&self) -> NodeId {
        NodeId(1)
    }

    /// The `body` element
    pub fn body(&self) -> NodeId {
        NodeId(2)
    }

    /// Document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set the document URL
    pub fn set_url<S: Into<String>>(&mut self, url: S) {
        self.url = url.into();
    }

    /// Append an element as the last child of `parent`
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.append_element_with(parent, name, &[])
    }

    /// Append an element with attributes as the last child of `parent`
    pub fn append_element_with(&mut self, parent: NodeId, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let index = self.nodes[parent.0].children.len();
        self.insert_element(parent, index, name, attributes)
    }

    /// Insert an element at `index` among the children of `parent`
    pub fn insert_element(
        &mut self,
        parent: NodeId,
        index: usize,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> NodeId {
        let kind = NodeKind::Element {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            hidden: false,
        };
        self.insert_node(parent, index, kind)
    }

    /// Append a text node as the last child of `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let index = self.nodes[parent.0].children.len();
        self.insert_node(parent, index, NodeKind::Text(text.to_string()))
    }

    fn insert_node(&mut self, parent: NodeId, index: usize, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MockNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, id);
        id
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Hide an element and its subtree (`display: none`)
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let NodeKind::Element { hidden: flag, .. } = &mut self.nodes[node.0].kind {
            *flag = hidden;
        }
    }

    /// Detach a node and its subtree from the document
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    fn element_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    /// Content of a text node
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.html() {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn is_displayed(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if let NodeKind::Element { hidden: true, .. } = self.nodes[id.0].kind {
                return false;
            }
            current = self.nodes[id.0].parent;
        }
        true
    }

    /// `:disabled` matching, including `fieldset` and `optgroup` inheritance
    ///
    /// Only form controls can be disabled. Controls inside the first
    /// `legend` of a disabled fieldset stay enabled.
    fn is_disabled(&self, node: NodeId) -> bool {
        let Some(name) = self.element_name(node).map(|n| n.to_ascii_lowercase()) else {
            return false;
        };
        if !FORM_CONTROLS.contains(&name.as_str()) {
            return false;
        }
        if self.attribute(node, "disabled").is_some() {
            return true;
        }

        let mut child = node;
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            if self.attribute(id, "disabled").is_some() {
                match self.element_name(id).map(|n| n.to_ascii_lowercase()).as_deref() {
                    Some("optgroup") if name == "option" && child == node => return true,
                    Some("fieldset") if !self.is_first_legend(id, child) => return true,
                    _ => {}
                }
            }
            child = id;
            current = self.nodes[id.0].parent;
        }
        false
    }

    fn is_first_legend(&self, fieldset: NodeId, child: NodeId) -> bool {
        let first_legend = self.nodes[fieldset.0]
            .children
            .iter()
            .copied()
            .find(|c| self.element_name(*c).is_some_and(|n| n.eq_ignore_ascii_case("legend")));
        first_legend == Some(child)
    }

    fn describe(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Element { name, .. } => match self.attribute(node, "id") {
                Some(id) => format!("{}#{}", name, id),
                None => name.clone(),
            },
            NodeKind::Text(_) => "#text".to_string(),
        }
    }

    /// Nodes below `root` in document order, `root` included
    fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev());
        }
        order
    }

    fn step_matches(&self, node: NodeId, step: &PathStep, context: Option<NodeId>) -> bool {
        let Some(name) = self.element_name(node) else {
            return false;
        };
        if !name.eq_ignore_ascii_case(&step.tag) {
            return false;
        }

        if let Some((attr, value)) = &step.attribute {
            if self.attribute(node, attr) != Some(value.as_str()) {
                return false;
            }
        }

        match &step.ancestor {
            None => true,
            Some(ancestor) => {
                let mut current = self.nodes[node.0].parent;
                while let Some(id) = current {
                    if Some(id) == context {
                        return false;
                    }
                    if self
                        .element_name(id)
                        .is_some_and(|n| n.eq_ignore_ascii_case(ancestor))
                    {
                        return true;
                    }
                    current = self.nodes[id.0].parent;
                }
                false
            }
        }
    }

    /// Evaluate a path expression, mirroring XPath union semantics
    fn find(&self, path: &ElementPath, scope: Option<NodeId>) -> Vec<NodeId> {
        let (candidates, context) = match (path.scope(), scope) {
            (PathScope::Relative, Some(scope)) => {
                let mut nodes = self.preorder(scope);
                nodes.remove(0);
                (nodes, Some(scope))
            }
            _ => (self.preorder(self.html()), None),
        };

        candidates
            .into_iter()
            .filter(|node| {
                path.alternatives()
                    .iter()
                    .any(|step| self.step_matches(*node, step, context))
            })
            .collect()
    }

    /// Native equivalent of the element path script
    fn element_path(&self, node: NodeId) -> Option<String> {
        self.element_name(node)?;

        let mut levels = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(name) = self.element_name(id) else {
                break;
            };
            let nth = match self.nodes[id.0].parent {
                Some(parent) => {
                    let siblings = &self.nodes[parent.0].children;
                    siblings
                        .iter()
                        .take_while(|sibling| **sibling != id)
                        .filter(|sibling| self.element_name(**sibling) == Some(name))
                        .count()
                        + 1
                }
                None => 1,
            };
            levels.push(format!("{}:nth-of-type({})", name, nth));
            current = self.nodes[id.0].parent;
        }

        levels.reverse();
        Some(levels.join(TAG_SEPARATOR))
    }

    /// Resolve a tag produced by the path script
    fn resolve_tag(&self, tag: &str) -> Result<Option<NodeId>, Error> {
        let mut levels = tag.split(TAG_SEPARATOR);
        let unsupported = || Error::script_execution_failed(format!("Unsupported selector: {}", tag));

        let (root_name, root_nth) = levels.next().and_then(parse_tag_level).ok_or_else(unsupported)?;
        if self.element_name(self.html()) != Some(root_name) || root_nth != 1 {
            return Ok(None);
        }

        let mut current = self.html();
        for level in levels {
            let (name, nth) = parse_tag_level(level).ok_or_else(unsupported)?;
            let next = self.nodes[current.0]
                .children
                .iter()
                .filter(|child| self.element_name(**child) == Some(name))
                .nth(nth - 1)
                .copied();
            match next {
                Some(node) => current = node,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock browser session over a [`MockDom`]
#[derive(Debug)]
pub struct MockSession {
    id: String,
    dom: RwLock<MockDom>,
}

impl MockSession {
    /// Create a new mock session
    pub fn new(dom: MockDom) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            dom: RwLock::new(dom),
        }
    }

    /// Handle for a node of this session's document
    pub async fn handle(&self, node: NodeId) -> ElementHandle {
        let dom = self.dom.read().await;
        self.handle_for(&dom, node)
    }

    /// Mutate the document (for testing)
    pub async fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut MockDom) -> R,
    {
        let mut dom = self.dom.write().await;
        f(&mut dom)
    }

    fn handle_for(&self, dom: &MockDom, node: NodeId) -> ElementHandle {
        ElementHandle::new(format!("{}:{}", self.id, node.0), dom.describe(node))
    }

    /// Map a handle back to an attached node
    fn resolve(&self, dom: &MockDom, element: &ElementHandle) -> Result<NodeId, Error> {
        let node = element
            .object_id()
            .split_once(':')
            .filter(|(session, _)| *session == self.id)
            .and_then(|(_, index)| index.parse::<usize>().ok())
            .filter(|index| *index < dom.nodes.len())
            .map(NodeId)
            .ok_or_else(|| Error::cdp(format!("Could not find object with given id: {}", element)))?;

        if !dom.is_connected(node) {
            return Err(Error::stale_element(element.to_string()));
        }

        Ok(node)
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn execute_script(&self, script: &str, element: &ElementHandle) -> Result<ScriptValue, Error> {
        let dom = self.dom.read().await;
        let node = self.resolve(&dom, element)?;

        if script != ELEMENT_PATH_SCRIPT {
            return Err(Error::script_execution_failed("Mock session only evaluates the element path script"));
        }

        Ok(dom
            .element_path(node)
            .map(ScriptValue::String)
            .unwrap_or(ScriptValue::Null))
    }

    async fn find_elements(
        &self,
        path: &ElementPath,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, Error> {
        let dom = self.dom.read().await;
        let scope = scope.map(|s| self.resolve(&dom, s)).transpose()?;

        Ok(dom
            .find(path, scope)
            .into_iter()
            .map(|node| self.handle_for(&dom, node))
            .collect())
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, Error> {
        let dom = self.dom.read().await;
        Ok(dom
            .resolve_tag(selector)?
            .map(|node| self.handle_for(&dom, node)))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, Error> {
        let dom = self.dom.read().await;
        let node = self.resolve(&dom, element)?;
        Ok(dom.is_displayed(node))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, Error> {
        let dom = self.dom.read().await;
        let node = self.resolve(&dom, element)?;
        Ok(!dom.is_disabled(node))
    }

    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, Error> {
        let dom = self.dom.read().await;
        let node = self.resolve(&dom, element)?;
        Ok(dom.attribute(node, name).map(|v| v.to_string()))
    }

    async fn current_url(&self) -> Result<String, Error> {
        Ok(self.dom.read().await.url().to_string())
    }
}
