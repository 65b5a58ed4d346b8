//! Declaration file lookup interface

use std::path::{Path, PathBuf};

/// Trait for finding the declaration file that owns a path
pub trait BuildFileLocator: Send + Sync {
    /// Nearest existing declaration file at or above `path`
    fn locate(&self, path: &Path) -> Option<PathBuf>;

    /// Where a declaration file for `path` would be created
    fn default_location(&self, path: &Path) -> Option<PathBuf>;
}
