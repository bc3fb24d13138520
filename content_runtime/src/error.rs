//! Error types for the content runtime.

use std::path::PathBuf;

use thiserror::Error;

use crate::content::ContentId;
use crate::dom::NodeId;

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// A library reference could not be turned into a constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No implementation is registered under the machine name.
    #[error("unknown library: {0}")]
    UnknownLibrary(String),

    /// The machine name is known but not at the requested version.
    #[error("library {name} is not registered at version {major}.{minor}")]
    UnknownVersion { name: String, major: u32, minor: u32 },

    /// The token is not of the form `"MachineName major.minor"`.
    #[error("malformed library reference: {0:?}")]
    MalformedReference(String),
}

/// A script or style resource failed to load. Reported per path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetLoadError {
    /// The fetch completed with an error.
    #[error("failed to load {url}: {reason}")]
    Failed { url: String, reason: String },

    /// The library has no configured asset folder.
    #[error("no asset root for library {library}, cannot resolve {path}")]
    UnresolvedRoot { library: String, path: String },
}

impl AssetLoadError {
    /// The URL (or unresolved relative path) the failure refers to.
    pub fn url(&self) -> &str {
        match self {
            AssetLoadError::Failed { url, .. } => url,
            AssetLoadError::UnresolvedRoot { path, .. } => path,
        }
    }
}

/// Errors raised by a DOM surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The node handle does not belong to this surface.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Appending would make a node its own ancestor.
    #[error("cannot append {child} below {parent}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Content parameters did not match what the content type expects.
#[derive(Debug, Error)]
#[error("invalid content parameters: {0}")]
pub struct ParameterError(#[from] pub serde_json::Error);

/// Errors surfaced by the content factory and instance operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Library resolution failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The content type rejected its parameters.
    #[error("content {content_id}: {source}")]
    Parameters {
        content_id: ContentId,
        #[source]
        source: ParameterError,
    },

    /// Wiring the instance into its DOM region failed.
    #[error("content {content_id} could not be attached: {source}")]
    Attach {
        content_id: ContentId,
        #[source]
        source: DomError,
    },

    /// An instance with this id is already live.
    #[error("content {0} is already registered")]
    DuplicateInstance(ContentId),

    /// No live instance has this id.
    #[error("no content instance with id {0}")]
    NotFound(ContentId),

    /// The content index has no bundle for this id.
    #[error("no content bundle for cid-{0}")]
    MissingBundle(ContentId),

    /// A content container has no usable `data-content-id`.
    #[error("container {0} has no valid data-content-id")]
    MissingContentId(NodeId),
}

/// The content store rejected an upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The display name is empty.
    #[error("content package needs a name")]
    MissingName,

    /// The package has no bytes.
    #[error("content package {0:?} is empty")]
    EmptyPackage(String),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`crate::RuntimeConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
