//! # Question Types
//!
//! The question life cycle engine and the built-in content types that run
//! on top of it.

pub mod multichoice;
pub mod question;

pub use multichoice::*;
pub use question::*;

use content_runtime::{LibraryDefinition, LibraryRegistry};

/// Register every built-in content type.
pub fn register_libraries(registry: &mut LibraryRegistry) {
    registry.register(
        LibraryDefinition::new(multichoice::library(), multichoice::build)
            .with_styles(STYLES.iter().copied()),
    );
    tracing::debug!(libraries = registry.len(), "built-in libraries registered");
}
