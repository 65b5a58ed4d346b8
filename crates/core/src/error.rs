use std::io;
use std::path::PathBuf;

use crate::lang::ParseError;

/// Errors that can occur while syncing BUILD files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    PatternError(String),

    #[error("{path} has {} parse error(s): {}", .errors.len(), format_parse_errors(.errors))]
    FailedPrecondition {
        path: PathBuf,
        errors: Vec<ParseError>,
    },

    #[error(
        "{path} does not match any role; add a pattern for it to match.module, match.test or match.fixture"
    )]
    UnsupportedFile { path: PathBuf },

    #[error(
        "cannot resolve import '{import}' from {from}; configure resolve.aliases or resolve.workspaces"
    )]
    UnresolvedImport { import: String, from: PathBuf },

    #[error("Internal error: {message}\n{snippet}")]
    Internal { message: String, snippet: String },

    #[error("{0}")]
    Other(String),
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for autodeps operations
pub type Result<T> = std::result::Result<T, Error>;
