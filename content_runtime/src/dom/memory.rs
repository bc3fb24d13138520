//! In-memory DOM surface for headless hosts and tests.

use std::collections::BTreeMap;

use super::{DomSurface, InputBinding, NodeId, Selector};
use crate::error::DomError;

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    /// Insertion-ordered, without duplicates.
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    binding: Option<InputBinding>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            binding: None,
        }
    }
}

/// Arena-backed element tree. Node 0 is the `body` root.
///
/// Removed nodes stay in the arena (handles never dangle) but are no
/// longer reachable from the root.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    elements: Vec<Element>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self {
            elements: vec![Element::new("body")],
        }
    }
}

impl MemoryDom {
    /// Create a document with an empty `body`.
    pub fn new() -> Self {
        Self::default()
    }

    fn element(&self, node: NodeId) -> Result<&Element, DomError> {
        self.elements.get(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.elements
            .get_mut(node.0)
            .ok_or(DomError::UnknownNode(node))
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.elements.get(n.0).and_then(|e| e.parent);
        }
        false
    }

    /// Whether `node` is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_ancestor_or_self(self.root(), node)
    }

    /// Classes of a node in insertion order.
    pub fn classes(&self, node: NodeId) -> Vec<&str> {
        self.elements
            .get(node.0)
            .map(|e| e.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Concatenated text of a node and its descendants, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(element) = self.elements.get(node.0) {
            out.push_str(&element.text);
            for child in &element.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// Serialize a subtree as HTML. Text is escaped; bindings are omitted.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(element) = self.elements.get(node.0) else {
            return;
        };
        out.push('<');
        out.push_str(&element.tag);
        if !element.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&element.classes.join(" "))));
        }
        for (name, value) in &element.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        out.push('>');
        out.push_str(&escape(&element.text));
        for child in &element.children {
            self.write_html(*child, out);
        }
        out.push_str(&format!("</{}>", element.tag));
    }

    /// Number of bindings in the subtree rooted at `from`.
    pub fn binding_count(&self, from: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if let Some(element) = self.elements.get(node.0) {
                if element.binding.is_some() {
                    count += 1;
                }
                stack.extend(element.children.iter().copied());
            }
        }
        count
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl DomSurface for MemoryDom {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.elements.push(Element::new(tag));
        NodeId(self.elements.len() - 1)
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.elements.get(node.0).map(|e| e.tag.as_str())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.element(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }

        if let Some(old_parent) = self.element(child)?.parent {
            self.element_mut(old_parent)?.children.retain(|c| *c != child);
        }
        self.element_mut(child)?.parent = Some(parent);
        self.element_mut(parent)?.children.push(child);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, DomError> {
        self.element(child)?;
        let siblings = &mut self.element_mut(parent)?.children;
        let Some(index) = siblings.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        siblings.remove(index);
        self.element_mut(child)?.parent = None;
        Ok(true)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.elements.get(node.0).and_then(|e| e.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.elements
            .get(node.0)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.element_mut(node)?.text = text.to_string();
        Ok(())
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.elements.get(node.0).map(|e| e.text.as_str())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.elements
            .get(node.0)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        for name in class.split_whitespace() {
            if !element.classes.iter().any(|c| c == name) {
                element.classes.push(name.to_string());
            }
        }
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        let names: Vec<&str> = class.split_whitespace().collect();
        element.classes.retain(|c| !names.contains(&c.as_str()));
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.elements
            .get(node.0)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            tracing::debug!(selector, "unsupported selector");
            return Vec::new();
        };

        let mut matches = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if selector.matches(self, node) {
                matches.push(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        matches
    }

    fn bind(&mut self, node: NodeId, binding: InputBinding) -> Result<(), DomError> {
        self.element_mut(node)?.binding = Some(binding);
        Ok(())
    }

    fn unbind(&mut self, node: NodeId) -> Option<InputBinding> {
        self.elements.get_mut(node.0).and_then(|e| e.binding.take())
    }

    fn binding(&self, node: NodeId) -> Option<&InputBinding> {
        self.elements.get(node.0).and_then(|e| e.binding.as_ref())
    }
}
