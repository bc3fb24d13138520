//! DOM surface - the rendering capabilities the runtime needs from a host.
//!
//! The runtime never talks to a concrete UI toolkit. It creates elements,
//! appends and removes children, toggles CSS classes, sets attributes and
//! text, queries descendants by a simple selector, and binds input
//! handlers. Input bindings carry data (owner + action) instead of
//! closures, and the runtime routes clicks to the owning instance.

mod memory;
mod selector;

pub use memory::*;
pub use selector::*;

use crate::content::ContentId;
use crate::error::DomError;

/// Handle to an element of a DOM surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an input on a bound element means to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// A named control, such as a button.
    Control(String),
    /// The n-th item of a list, such as an answer option.
    Item(usize),
}

impl Action {
    /// Create a named control action.
    pub fn control(name: impl Into<String>) -> Self {
        Action::Control(name.into())
    }

    /// Whether this is the named control.
    pub fn is_control(&self, name: &str) -> bool {
        matches!(self, Action::Control(n) if n == name)
    }
}

/// A click binding: which instance handles it and what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    pub owner: ContentId,
    pub action: Action,
}

impl InputBinding {
    pub fn new(owner: ContentId, action: Action) -> Self {
        Self { owner, action }
    }
}

/// Capability set a host rendering surface must provide.
pub trait DomSurface {
    /// The document root.
    fn root(&self) -> NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Tag name of an element.
    fn tag(&self, node: NodeId) -> Option<&str>;

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Detach `child` from `parent`. Returns `false` if it was not a child.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, DomError>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;

    fn text(&self, node: NodeId) -> Option<&str>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError>;

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Descendants of `root` (excluding `root`) matching `selector`, in
    /// document order. See [`Selector`] for the supported syntax.
    fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId>;

    /// Bind a click handler to `node`, replacing any previous binding.
    fn bind(&mut self, node: NodeId, binding: InputBinding) -> Result<(), DomError>;

    /// Remove the click binding of `node`.
    fn unbind(&mut self, node: NodeId) -> Option<InputBinding>;

    fn binding(&self, node: NodeId) -> Option<&InputBinding>;

    /// Add or remove a class depending on `on`.
    fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) -> Result<(), DomError> {
        if on {
            self.add_class(node, class)
        } else {
            self.remove_class(node, class)
        }
    }

    /// Create an element carrying the given classes.
    fn create_with_classes(&mut self, tag: &str, classes: &[&str]) -> Result<NodeId, DomError> {
        let node = self.create_element(tag);
        for class in classes {
            self.add_class(node, class)?;
        }
        Ok(node)
    }

    /// The nearest binding at or above `node`, as a click would bubble.
    fn closest_binding(&self, node: NodeId) -> Option<(NodeId, InputBinding)> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(binding) = self.binding(n) {
                return Some((n, binding.clone()));
            }
            current = self.parent(n);
        }
        None
    }

    /// First match of [`DomSurface::query_selector_all`].
    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.query_selector_all(root, selector).into_iter().next()
    }
}
