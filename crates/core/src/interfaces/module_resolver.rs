//! Module resolution interface

use std::path::{Path, PathBuf};

use serde::Serialize;

/// How an import specifier was turned into a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    WorkspaceAlias,
    ConfiguredPathAlias,
    LocalResolution,
    /// Not resolvable; the import is reported instead of becoming a dependency
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Resolved file, or the original specifier for [`ResolutionMethod::Passthrough`]
    pub resolved_path: PathBuf,
    pub method: ResolutionMethod,
}

impl Resolution {
    pub fn passthrough(import: &str) -> Self {
        Self {
            resolved_path: PathBuf::from(import),
            method: ResolutionMethod::Passthrough,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.method != ResolutionMethod::Passthrough
    }
}

/// Trait for resolving import specifiers to files
pub trait ModuleResolver: Send + Sync {
    /// Resolve `import` as written in `from_file`
    fn resolve(&self, import: &str, from_file: &Path) -> Resolution;
}
