use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{fmt_command, init_command, inspect_command, sync_command, watch_command};

#[derive(Parser, Debug)]
#[command(name = "autodeps")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Log debug output unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of discovering .autodeps.json files
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Update the BUILD rules owning the given source files
    #[command(visible_alias = "s")]
    Sync {
        /// Source files, or directories to sync every matching file in
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the sync reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a BUILD file in canonical form
    Fmt {
        /// Path to the BUILD file
        file: PathBuf,

        /// Only report whether the file is already canonical
        #[arg(long)]
        check: bool,
    },
    /// List the managed rules of a BUILD file
    #[command(visible_alias = "i")]
    Inspect {
        /// Path to the BUILD file
        file: PathBuf,

        /// Print the rules as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sync source files as they change
    Watch {
        /// Directory to watch
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Write a default .autodeps.json
    Init {
        /// Directory to write the config to
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self, config: Option<&Path>) -> Result<()> {
        match self {
            Commands::Sync { paths, json } => sync_command(&paths, json, config),
            Commands::Fmt { file, check } => fmt_command(&file, check, config),
            Commands::Inspect { file, json } => inspect_command(&file, json, config),
            Commands::Watch { dir } => watch_command(&dir, config),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}
