//! Boundary interfaces
//!
//! The sync pipeline reaches the outside world only through these traits, so
//! import syntax, module resolution and file layout can be swapped per
//! workspace. Default implementations live in [`crate::services`].

pub mod build_file_locator;
pub mod import_extractor;
pub mod module_resolver;

pub use build_file_locator::BuildFileLocator;
pub use import_extractor::{ImportExtractor, SourceKind};
pub use module_resolver::{ModuleResolver, Resolution, ResolutionMethod};
