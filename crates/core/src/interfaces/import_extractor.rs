//! Import extraction interface

use std::path::Path;

/// Language flavour of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TypeScript,
    JavaScript,
}

impl SourceKind {
    /// Guess the kind from a file extension; `None` for files without imports
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "tsx" | "mts" | "cts" => Some(SourceKind::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(SourceKind::JavaScript),
            _ => None,
        }
    }
}

/// Trait for pulling import specifiers out of source text
pub trait ImportExtractor: Send + Sync {
    /// Import specifiers in order of first appearance, without duplicates
    fn extract_imports(&self, text: &str, kind: SourceKind) -> Vec<String>;
}
