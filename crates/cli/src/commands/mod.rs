pub mod fmt;
pub mod init;
pub mod inspect;
pub mod sync;
pub mod watch;

pub use fmt::fmt_command;
pub use init::init_command;
pub use inspect::inspect_command;
pub use sync::sync_command;
pub use watch::watch_command;

use std::path::Path;

use anyhow::{Context, Result};
use autodeps_core::{AutoDepsRunner, ConfigLoader};

/// Runner for the workspace of `path`, or for an explicit config file
pub(crate) fn load_runner(path: &Path, config: Option<&Path>) -> Result<AutoDepsRunner> {
    let path = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let loaded = match config {
        Some(file) => ConfigLoader::load_file(file)
            .with_context(|| format!("Failed to load config {}", file.display()))?,
        None => ConfigLoader::load_for_path(&path)
            .with_context(|| format!("Failed to load config for {}", path.display()))?,
    };
    AutoDepsRunner::new(loaded).context("Failed to set up the runner")
}
