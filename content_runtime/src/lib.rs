//! # Content Runtime
//!
//! Renders self-contained interactive content items inside a host page.
//! A content definition (library reference + parameters) is resolved
//! against a registry of content-type implementations, instantiated,
//! attached to a DOM region and tracked until removed.
//!
//! The host is reached only through traits: [`DomSurface`] for rendering,
//! [`AssetFetcher`] for loading resources and [`ContentIndex`] for the
//! available content. Everything runs on one thread.

pub mod assets;
pub mod config;
pub mod content;
pub mod dom;
pub mod error;
pub mod events;
pub mod instances;
pub mod integration;
pub mod library;
pub mod logging;
pub mod runtime;

pub use assets::*;
pub use config::*;
pub use content::*;
pub use dom::*;
pub use error::*;
pub use events::*;
pub use instances::*;
pub use integration::*;
pub use library::*;
pub use runtime::*;
