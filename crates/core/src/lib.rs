//! autodeps-core - Keeps BUILD file dependencies in sync with source imports
//!
//! This crate provides functionality to:
//! - Parse BUILD files into a comment-preserving syntax tree and render them back exactly
//! - Find the rule owning a source file and rewrite its `deps`, or add a rule or file
//! - Resolve the imports of TypeScript and JavaScript sources to build labels
pub mod builder;
pub mod cache;
pub mod config;
pub mod dependency;
pub mod error;
pub mod format;
pub mod inspect;
pub mod interfaces;
pub mod lang;
pub mod patterns;
pub mod qualifier;
pub mod runner;
pub mod services;
pub mod visitors;
pub mod writer;

// Re-export commonly used types and traits
pub use error::{Error, Result};

// Re-export main API components
pub use config::{Config, ConfigLoader, LoadedConfig};
pub use dependency::{Dependency, sort_targets};
pub use format::FormatReport;
pub use inspect::RuleSummary;
pub use lang::{ParseError, Root, parse_source};
pub use patterns::FileRole;
pub use runner::{AutoDepsRunner, SyncReport, UnresolvedDependency};
pub use visitors::TaskStatus;
pub use writer::{WriteOutcome, WriteStrategy, Writer};
