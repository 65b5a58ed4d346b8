//! Default implementations of the boundary interfaces
//!
//! Filesystem lookups, regex based import scanning and config driven module
//! resolution for TypeScript and JavaScript workspaces.

pub mod configured_module_resolver;
pub mod fs_build_file_locator;
pub mod regex_import_extractor;

pub use configured_module_resolver::ConfiguredModuleResolver;
pub use fs_build_file_locator::FsBuildFileLocator;
pub use regex_import_extractor::RegexImportExtractor;

use std::path::{Component, Path, PathBuf};

/// Lexically remove `.` and `..` components
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            Component::CurDir => {}
            c => normalized.push(c),
        }
    }
    normalized
}
