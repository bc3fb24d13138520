//! Contracts with the host integration: content index, asset roots,
//! package storage and read-only embedding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::ContentId;
use crate::error::StoreError;
use crate::library::LibraryReference;

/// Message rendered into a container when there is no content to show.
pub const NOT_FOUND_MESSAGE: &str = "Content not found. Please create one in the editor first.";

/// Resolves base URLs for library and global assets.
pub trait AssetRoots {
    /// Asset folder of a library, if known.
    fn library_root(&self, library: &LibraryReference) -> Option<String>;

    /// Folder used for paths requested without a library.
    fn global_root(&self) -> String;
}

/// One item of the content index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: ContentId,
    pub name: String,
    /// Where the package can be fetched from.
    pub locator: String,
}

/// Everything needed to instantiate a content, stored under `cid-<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBundle {
    pub library: LibraryReference,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl ContentBundle {
    pub fn new(library: LibraryReference, params: Value) -> Self {
        Self {
            library,
            params,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Lists available content and hands out bundles by id.
pub trait ContentIndex {
    fn entries(&self) -> Vec<ContentEntry>;

    fn bundle(&self, id: ContentId) -> Option<ContentBundle>;
}

/// Accepts uploaded content packages.
pub trait ContentStore {
    /// Store a package and make it discoverable through the index.
    fn store(&mut self, name: &str, package: Vec<u8>) -> Result<ContentEntry, StoreError>;
}

/// Renderable representation of a content for read-only embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    Html(String),
    NotFound(ContentId),
}

/// Turns a content id into an embeddable representation.
pub trait EmbedSurface {
    fn embed(&self, id: ContentId) -> Embed;
}

/// In-memory content index and store. Ids are assigned from 1 in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    entries: Vec<ContentEntry>,
    /// Keyed by `cid-<id>`.
    bundles: HashMap<String, ContentBundle>,
    packages: HashMap<ContentId, Vec<u8>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ContentId {
        ContentId(self.entries.len() as u64 + 1)
    }

    /// Add a content with its bundle. Returns the assigned id.
    pub fn insert(&mut self, name: impl Into<String>, bundle: ContentBundle) -> ContentId {
        let id = self.next_id();
        let name = name.into();
        self.entries.push(ContentEntry {
            id,
            locator: format!("memory:{}", name),
            name,
        });
        self.bundles.insert(id.bundle_key(), bundle);
        id
    }

    /// Raw bytes of an uploaded package.
    pub fn package(&self, id: ContentId) -> Option<&[u8]> {
        self.packages.get(&id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentIndex for MemoryIndex {
    fn entries(&self) -> Vec<ContentEntry> {
        self.entries.clone()
    }

    fn bundle(&self, id: ContentId) -> Option<ContentBundle> {
        self.bundles.get(&id.bundle_key()).cloned()
    }
}

impl ContentStore for MemoryIndex {
    fn store(&mut self, name: &str, package: Vec<u8>) -> Result<ContentEntry, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::MissingName);
        }
        if package.is_empty() {
            return Err(StoreError::EmptyPackage(name.to_string()));
        }

        let entry = ContentEntry {
            id: self.next_id(),
            name: name.to_string(),
            locator: format!("memory:{}", name),
        };
        tracing::info!(
            content_id = %entry.id,
            name,
            bytes = package.len(),
            "stored content package"
        );
        self.packages.insert(entry.id, package);
        self.entries.push(entry.clone());
        Ok(entry)
    }
}

/// Embeds a placeholder page naming the content, or reports it missing.
#[derive(Debug, Clone)]
pub struct PlaceholderEmbed<I> {
    index: I,
}

impl<I: ContentIndex> PlaceholderEmbed<I> {
    pub fn new(index: I) -> Self {
        Self { index }
    }
}

impl<I: ContentIndex> EmbedSurface for PlaceholderEmbed<I> {
    fn embed(&self, id: ContentId) -> Embed {
        match self.index.entries().into_iter().find(|e| e.id == id) {
            Some(entry) => Embed::Html(format!(
                "<html><body><h3>Content placeholder: {}</h3></body></html>",
                entry
                    .name
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;")
            )),
            None => Embed::NotFound(id),
        }
    }
}
