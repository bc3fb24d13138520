//! Runtime configuration, loaded from TOML.
//!
//! ```toml
//! base_url = "/h5p"
//! content_selector = ".h5p-content"
//! bind_resize = true
//! log_filter = "content_runtime=debug"
//!
//! [[libraries]]
//! name = "H5P.MultiChoice"
//! version = "1.16"
//! path = "H5P.MultiChoice-1.16"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::DEFAULT_EXTERNAL_PREFIXES;
use crate::content::ContentId;
use crate::error::ConfigError;
use crate::integration::AssetRoots;
use crate::library::LibraryReference;

/// Where a library's assets live, relative to `<base_url>/libraries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryPath {
    pub name: String,
    /// `major.minor`.
    pub version: String,
    pub path: String,
}

/// Settings for a [`crate::ContentRuntime`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Integration base URL; libraries and content live below it.
    pub base_url: String,

    /// Class selector identifying content containers at boot.
    pub content_selector: String,

    /// Asset paths starting with one of these are used verbatim.
    pub external_prefixes: Vec<String>,

    /// Whether boot-created instances re-dispatch window resizes.
    pub bind_resize: bool,

    /// Filter used by [`crate::logging::init`] when `RUST_LOG` is unset.
    pub log_filter: String,

    pub libraries: Vec<LibraryPath>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_url: "/h5p".to_string(),
            content_selector: ".h5p-content".to_string(),
            external_prefixes: DEFAULT_EXTERNAL_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            bind_resize: true,
            log_filter: "info".to_string(),
            libraries: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Add a library asset folder.
    pub fn with_library(mut self, library: &LibraryReference, path: impl Into<String>) -> Self {
        self.libraries.push(LibraryPath {
            name: library.machine_name.clone(),
            version: library.version(),
            path: path.into(),
        });
        self
    }

    /// URL of the folder holding a content's files.
    pub fn content_path(&self, id: ContentId) -> String {
        format!("{}/content/{}", self.base_url.trim_end_matches('/'), id)
    }
}

impl AssetRoots for RuntimeConfig {
    fn library_root(&self, library: &LibraryReference) -> Option<String> {
        let version = library.version();
        self.libraries
            .iter()
            .find(|l| l.name == library.machine_name && l.version == version)
            .map(|l| format!("{}/libraries/{}", self.base_url.trim_end_matches('/'), l.path))
    }

    fn global_root(&self) -> String {
        format!("{}/libraries", self.base_url.trim_end_matches('/'))
    }
}
