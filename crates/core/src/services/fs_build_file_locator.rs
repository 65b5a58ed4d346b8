use std::path::{Path, PathBuf};

use tracing::debug;

use crate::interfaces::BuildFileLocator;

/// Looks for declaration files on disk, from a path up to the workspace root
pub struct FsBuildFileLocator {
    workspace_root: PathBuf,
    build_file_names: Vec<String>,
}

impl FsBuildFileLocator {
    pub fn new(workspace_root: impl Into<PathBuf>, build_file_names: Vec<String>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            build_file_names,
        }
    }

    fn start_dir(path: &Path) -> Option<&Path> {
        if path.is_dir() {
            Some(path)
        } else {
            path.parent()
        }
    }
}

impl BuildFileLocator for FsBuildFileLocator {
    fn locate(&self, path: &Path) -> Option<PathBuf> {
        let mut current = Self::start_dir(path);
        while let Some(dir) = current {
            if !dir.starts_with(&self.workspace_root) {
                break;
            }
            // Earlier names win within one directory
            for name in &self.build_file_names {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    debug!("Declaration file for {:?}: {:?}", path, candidate);
                    return Some(candidate);
                }
            }
            current = dir.parent();
        }
        None
    }

    fn default_location(&self, path: &Path) -> Option<PathBuf> {
        let dir = Self::start_dir(path)?;
        let name = self.build_file_names.first()?;
        Some(dir.join(name))
    }
}
