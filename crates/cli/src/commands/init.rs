use std::path::{Path, PathBuf};
use std::env;

use anyhow::{Context, Result};
use autodeps_core::Config;
use autodeps_core::config::CONFIG_FILE_NAME;
use tracing::info;

pub fn init_command(cwd: Option<&Path>, force: bool) -> Result<()> {
    let project_root = match cwd {
        Some(cwd) => PathBuf::from(cwd),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let config_path = project_root.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Wrote default config to {:?}", config_path);
    println!("✅ Created config: {}", config_path.display());
    Ok(())
}
