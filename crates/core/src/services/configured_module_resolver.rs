use std::path::{Path, PathBuf};

use tracing::debug;

use super::normalize;
use crate::config::ResolveConfig;
use crate::interfaces::{ModuleResolver, Resolution, ResolutionMethod};

/// Resolves imports with the `resolve` config section.
///
/// Order: workspace packages, path aliases (longest prefix first), relative
/// specifiers. Anything else, such as a third-party package, passes through.
pub struct ConfiguredModuleResolver {
    workspace_root: PathBuf,
    config: ResolveConfig,
}

impl ConfiguredModuleResolver {
    pub fn new(workspace_root: impl Into<PathBuf>, config: ResolveConfig) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            config,
        }
    }

    /// The file a specifier base names: itself, with an extension, or a directory index
    fn probe(&self, base: &Path) -> Option<PathBuf> {
        let base = normalize(base);
        if base.is_file() {
            return Some(base);
        }
        let with_extension = |path: &Path, ext: &str| {
            let mut name = path.as_os_str().to_os_string();
            name.push(ext);
            PathBuf::from(name)
        };
        if let Some(found) = self
            .config
            .extensions
            .iter()
            .map(|ext| with_extension(&base, ext))
            .find(|p| p.is_file())
        {
            return Some(found);
        }
        if base.is_dir() {
            return self
                .config
                .extensions
                .iter()
                .map(|ext| base.join(format!("index{ext}")))
                .find(|p| p.is_file());
        }
        None
    }

    fn workspace_package(&self, import: &str) -> Option<PathBuf> {
        self.config.workspaces.iter().find_map(|(name, dir)| {
            let rest = import.strip_prefix(name.as_str())?;
            if rest.is_empty() {
                let dir = normalize(&self.workspace_root.join(dir));
                // A bare package import depends on the package itself
                return self.probe(&dir).or_else(|| dir.is_dir().then_some(dir));
            }
            let sub = rest.strip_prefix('/')?;
            self.probe(&self.workspace_root.join(dir).join(sub))
        })
    }

    fn path_alias(&self, import: &str) -> Option<PathBuf> {
        let mut aliases: Vec<(&String, &String)> = self.config.aliases.iter().collect();
        aliases.sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.len()));

        aliases.into_iter().find_map(|(pattern, replacement)| {
            let mapped = match pattern.strip_suffix('*') {
                Some(prefix) => {
                    let rest = import.strip_prefix(prefix)?;
                    replacement.replacen('*', rest, 1)
                }
                None if pattern == import => replacement.clone(),
                None => return None,
            };
            self.probe(&self.workspace_root.join(mapped))
        })
    }
}

impl ModuleResolver for ConfiguredModuleResolver {
    fn resolve(&self, import: &str, from_file: &Path) -> Resolution {
        let resolved = |path: PathBuf, method: ResolutionMethod| {
            debug!("Resolved '{}' to {:?} ({:?})", import, path, method);
            Resolution {
                resolved_path: path,
                method,
            }
        };

        if let Some(path) = self.workspace_package(import) {
            return resolved(path, ResolutionMethod::WorkspaceAlias);
        }
        if let Some(path) = self.path_alias(import) {
            return resolved(path, ResolutionMethod::ConfiguredPathAlias);
        }
        if import.starts_with("./") || import.starts_with("../") || import.starts_with('/') {
            let base = from_file.parent().unwrap_or(Path::new("")).join(import);
            if let Some(path) = self.probe(&base) {
                return resolved(path, ResolutionMethod::LocalResolution);
            }
        }

        debug!("Leaving '{}' unresolved", import);
        Resolution::passthrough(import)
    }
}
