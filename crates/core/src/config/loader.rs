//! Config file discovery

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::Config;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".autodeps.json";

/// Files marking a workspace root when no config file exists
pub const WORKSPACE_MARKERS: &[&str] = &[".plzconfig", "WORKSPACE", "WORKSPACE.bazel", "MODULE.bazel"];

/// A merged config and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Config files applied, outermost first
    pub sources: Vec<PathBuf>,
    pub workspace_root: PathBuf,
}

impl LoadedConfig {
    /// Directory name used for package paths
    pub fn root_dir_name(&self) -> String {
        self.config.root_dir_name.clone().unwrap_or_else(|| {
            self.workspace_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Every config file from `start` up to the filesystem root, innermost first
    pub fn find_config_files(start: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut current = Some(start_dir(start));
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                found.push(candidate);
            }
            current = dir.parent().map(Path::to_path_buf);
        }
        found
    }

    /// Nearest ancestor holding a workspace marker file
    pub fn find_workspace_marker(start: &Path) -> Option<PathBuf> {
        let mut current = Some(start_dir(start));
        while let Some(dir) = current {
            if WORKSPACE_MARKERS.iter().any(|m| dir.join(m).exists()) {
                return Some(dir);
            }
            current = dir.parent().map(Path::to_path_buf);
        }
        None
    }

    /// Load and merge every config file applying to `path`
    pub fn load_for_path(path: &Path) -> Result<LoadedConfig> {
        let mut sources = Self::find_config_files(path);
        sources.reverse();
        debug!("Config files for {:?}: {:?}", path, sources);

        let layers = sources
            .iter()
            .map(|source| read_layer(source))
            .collect::<Result<Vec<_>>>()?;
        let config = Config::from_layers(layers)?;

        let workspace_root = match sources.first().and_then(|s| s.parent()) {
            Some(dir) => dir.to_path_buf(),
            None => Self::find_workspace_marker(path).unwrap_or_else(|| start_dir(path)),
        };

        Ok(LoadedConfig {
            config,
            sources,
            workspace_root,
        })
    }

    /// Load one explicit config file; its directory is the workspace root
    pub fn load_file(path: &Path) -> Result<LoadedConfig> {
        let config = Config::from_layers(vec![read_layer(path)?])?;
        let workspace_root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(LoadedConfig {
            config,
            sources: vec![path.to_path_buf()],
            workspace_root,
        })
    }
}

fn start_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn read_layer(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {e}", path.display())))
}
