//! Library references and the registry of content-type implementations.
//!
//! A library is identified by a machine name and a `major.minor` version,
//! written as a single token such as `"H5P.MultiChoice 1.16"`.

mod registry;

pub use registry::*;

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;

/// Identifies a content-type implementation and its asset bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LibraryReference {
    pub machine_name: String,
    pub major_version: u32,
    pub minor_version: u32,
}

impl LibraryReference {
    /// Create a reference from its parts.
    pub fn new(machine_name: impl Into<String>, major_version: u32, minor_version: u32) -> Self {
        Self {
            machine_name: machine_name.into(),
            major_version,
            minor_version,
        }
    }

    /// Parse a `"MachineName major.minor"` token.
    pub fn parse(token: &str) -> Result<Self, ResolutionError> {
        let malformed = || ResolutionError::MalformedReference(token.to_string());

        let mut parts = token.split_whitespace();
        let (Some(name), Some(version), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };

        let (major, minor) = version.split_once('.').ok_or_else(malformed)?;
        let major = major.parse().map_err(|_| malformed())?;
        let minor = minor.parse().map_err(|_| malformed())?;

        Ok(Self::new(name, major, minor))
    }

    /// The `major.minor` part of the token.
    pub fn version(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }
}

impl std::fmt::Display for LibraryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.machine_name, self.major_version, self.minor_version
        )
    }
}

impl std::str::FromStr for LibraryReference {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LibraryReference {
    type Error = ResolutionError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Self::parse(&token)
    }
}

impl From<LibraryReference> for String {
    fn from(reference: LibraryReference) -> Self {
        reference.to_string()
    }
}
