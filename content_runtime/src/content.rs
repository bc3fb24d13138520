//! The content-type capability set implemented by every library.

use std::any::Any;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom::{Action, DomSurface, NodeId};
use crate::error::DomError;
use crate::events::EventDispatcher;
use crate::library::LibraryReference;

/// Content id, unique within a page session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl ContentId {
    /// Key under which the integration stores this content's bundle.
    pub fn bundle_key(&self) -> String {
        format!("cid-{}", self.0)
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ContentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ContentId)
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        ContentId(id)
    }
}

/// Settings passed to a content constructor alongside its parameters.
#[derive(Debug, Clone)]
pub struct ContentSettings {
    /// Enclosing content, if this instance is embedded in another.
    pub parent: Option<ContentId>,
    pub library: LibraryReference,
    pub metadata: Option<Value>,
    /// The dispatcher of the instance being built; contents emit through it.
    pub events: Rc<EventDispatcher>,
}

/// Outcome of [`Content::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// The content rendered itself into the region.
    Rendered,
    /// The content has no attach capability; the factory falls back to
    /// appending [`Content::container`].
    Unsupported,
}

/// A live content-type implementation.
///
/// Only [`Content::title`] and the `Any` accessors are mandatory; the rest
/// are optional capabilities with inert defaults.
pub trait Content: Any {
    /// Render into `region`.
    fn attach(&mut self, dom: &mut dyn DomSurface, region: NodeId) -> Result<Attachment, DomError> {
        let _ = (dom, region);
        Ok(Attachment::Unsupported)
    }

    /// A container the content built ahead of attachment.
    fn container(&self) -> Option<NodeId> {
        None
    }

    /// Undo attachment: drop input bindings and remove rendered nodes.
    fn detach(&mut self, dom: &mut dyn DomSurface) {
        let _ = dom;
    }

    /// React to an input routed from a bound DOM node.
    fn handle_input(&mut self, dom: &mut dyn DomSurface, action: &Action) {
        let _ = (dom, action);
    }

    fn score(&self) -> u32 {
        0
    }

    fn max_score(&self) -> u32 {
        0
    }

    /// Human-readable title.
    fn title(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
