//! Typed registry mapping library references to constructors.

use std::collections::HashMap;

use serde_json::Value;

use super::LibraryReference;
use crate::content::{Content, ContentId, ContentSettings};
use crate::dom::DomSurface;
use crate::error::{ParameterError, ResolutionError};

/// Builds a content instance from its parameters.
///
/// The DOM surface is available so a content type can prepare a container
/// before it is attached.
pub type Constructor = fn(
    Value,
    ContentId,
    ContentSettings,
    &mut dyn DomSurface,
) -> Result<Box<dyn Content>, ParameterError>;

/// A registered content-type implementation and the assets it needs.
#[derive(Clone)]
pub struct LibraryDefinition {
    pub reference: LibraryReference,
    /// Script paths, relative to the library's asset root unless external.
    pub scripts: Vec<String>,
    /// Style paths, relative to the library's asset root unless external.
    pub styles: Vec<String>,
    pub constructor: Constructor,
}

impl LibraryDefinition {
    /// Create a definition with no preloaded assets.
    pub fn new(reference: LibraryReference, constructor: Constructor) -> Self {
        Self {
            reference,
            scripts: Vec::new(),
            styles: Vec::new(),
            constructor,
        }
    }

    /// Set the scripts loaded before the first instance is created.
    pub fn with_scripts(mut self, scripts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scripts = scripts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the styles loaded before the first instance is created.
    pub fn with_styles(mut self, styles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.styles = styles.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Debug for LibraryDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryDefinition")
            .field("reference", &self.reference)
            .field("scripts", &self.scripts)
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

/// All content types known to a runtime. Registration is explicit.
#[derive(Debug, Default)]
pub struct LibraryRegistry {
    /// Machine name -> definitions, one per version.
    libraries: HashMap<String, Vec<LibraryDefinition>>,
}

impl LibraryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition.
    ///
    /// Returns the definition previously registered at the same name and version.
    pub fn register(&mut self, definition: LibraryDefinition) -> Option<LibraryDefinition> {
        let versions = self
            .libraries
            .entry(definition.reference.machine_name.clone())
            .or_default();

        match versions
            .iter_mut()
            .find(|d| d.reference == definition.reference)
        {
            Some(existing) => Some(std::mem::replace(existing, definition)),
            None => {
                versions.push(definition);
                None
            }
        }
    }

    /// Resolve a reference to exactly one definition.
    pub fn resolve(
        &self,
        reference: &LibraryReference,
    ) -> Result<&LibraryDefinition, ResolutionError> {
        let versions = self
            .libraries
            .get(&reference.machine_name)
            .ok_or_else(|| ResolutionError::UnknownLibrary(reference.machine_name.clone()))?;

        versions
            .iter()
            .find(|d| d.reference == *reference)
            .ok_or_else(|| ResolutionError::UnknownVersion {
                name: reference.machine_name.clone(),
                major: reference.major_version,
                minor: reference.minor_version,
            })
    }

    /// Check if any version of a machine name is registered.
    pub fn contains(&self, machine_name: &str) -> bool {
        self.libraries.contains_key(machine_name)
    }

    /// Iterate over every registered definition.
    pub fn definitions(&self) -> impl Iterator<Item = &LibraryDefinition> {
        self.libraries.values().flatten()
    }

    /// Total number of registered definitions.
    pub fn len(&self) -> usize {
        self.libraries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}
