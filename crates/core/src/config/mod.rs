//! Configuration management for autodeps

pub mod loader;
pub mod merge;
pub mod schema;
mod settings;

// Re-export main types
pub use loader::{CONFIG_FILE_NAME, ConfigLoader, LoadedConfig};
pub use schema::{Field, FieldEntry, FieldType, ManagedSchema};
pub use settings::{
    BUILTIN_RULES, Config, GlobMatchers, ManageConfig, MatchConfig, OnCreateConfig,
    OnUpdateConfig, ResolveConfig, RuleTemplate, SrcsMode,
};
