//! Main runner that coordinates import extraction, resolution and declaration file writes

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::builder::format_target_name;
use crate::cache::AstCache;
use crate::config::{Config, ConfigLoader, LoadedConfig};
use crate::dependency::{Dependency, sort_targets};
use crate::error::{Error, Result};
use crate::format::{FormatReport, format_source};
use crate::inspect::{RuleSummary, summarize_rules};
use crate::interfaces::{BuildFileLocator, ImportExtractor, ModuleResolver, SourceKind};
use crate::patterns::{FileRole, RoleMatcher};
use crate::qualifier::TargetFile;
use crate::services::{ConfiguredModuleResolver, FsBuildFileLocator, RegexImportExtractor};
use crate::visitors::{RuleNameVisitor, TaskStatus, VisitContext, Visitor};
use crate::writer::{WriteOutcome, Writer};

/// An import that did not become a dependency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedDependency {
    pub import: String,
    /// What to configure to make it resolvable
    pub hint: String,
}

/// Result of syncing one source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub source_file: PathBuf,
    pub build_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<WriteOutcome>,
    /// Labels written to the rule's deps, sorted
    pub dependencies: Vec<String>,
    pub unresolved: Vec<UnresolvedDependency>,
    pub failures: Vec<String>,
    pub status: TaskStatus,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source_file.display(), self.status)?;
        if let Some(outcome) = &self.outcome {
            let verb = if outcome.changed { "wrote" } else { "kept" };
            write!(
                f,
                " ({} {}, {}, {} deps)",
                verb,
                outcome.path.display(),
                outcome.strategy,
                self.dependencies.len()
            )?;
        }
        for unresolved in &self.unresolved {
            write!(f, "\n  unresolved: {}", unresolved.hint)?;
        }
        for failure in &self.failures {
            write!(f, "\n  failed: {failure}")?;
        }
        Ok(())
    }
}

pub struct AutoDepsRunner {
    config: Arc<Config>,
    workspace_root: PathBuf,
    root_dir_name: String,
    roles: RoleMatcher,
    cache: AstCache,
    writer: Writer,
    extractor: Box<dyn ImportExtractor>,
    resolver: Box<dyn ModuleResolver>,
    locator: Box<dyn BuildFileLocator>,
}

impl AutoDepsRunner {
    /// Runner with the default filesystem services
    pub fn new(loaded: LoadedConfig) -> Result<Self> {
        let workspace_root = std::path::absolute(&loaded.workspace_root)?;
        let config = loaded.config;
        let extractor = Box::new(RegexImportExtractor::new()?);
        let resolver = Box::new(ConfiguredModuleResolver::new(
            &workspace_root,
            config.resolve.clone(),
        ));
        let locator = Box::new(FsBuildFileLocator::new(
            &workspace_root,
            config.build_file_names.clone(),
        ));
        Self::with_services(config, workspace_root, extractor, resolver, locator)
    }

    /// Runner for the workspace `path` belongs to, configured from the files above it
    pub fn for_path(path: &Path) -> Result<Self> {
        Self::new(ConfigLoader::load_for_path(path)?)
    }

    pub fn with_services(
        config: Config,
        workspace_root: PathBuf,
        extractor: Box<dyn ImportExtractor>,
        resolver: Box<dyn ModuleResolver>,
        locator: Box<dyn BuildFileLocator>,
    ) -> Result<Self> {
        config.validate()?;
        let roles = RoleMatcher::new(&config.matchers)?;
        let root_dir_name = config.root_dir_name.clone().unwrap_or_else(|| {
            workspace_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let config = Arc::new(config);
        Ok(Self {
            cache: AstCache::new(config.cache_size),
            writer: Writer::new(config.clone()),
            config,
            workspace_root,
            root_dir_name,
            roles,
            extractor,
            resolver,
            locator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Role of a file by its workspace-relative path
    pub fn role_of(&self, path: &Path) -> Option<FileRole> {
        let relative = relative_path(path, &self.workspace_root)?;
        self.roles.role_of(&relative)
    }

    /// Whether `path` is one of the configured declaration file names
    pub fn is_build_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.config.build_file_names.iter().any(|b| b == name))
    }

    /// Bring the rule owning `path` in line with the imports of `path`
    pub fn sync_file(&mut self, path: &Path) -> Result<SyncReport> {
        let source_file = std::path::absolute(path)?;
        let span = info_span!("sync", file = %source_file.display());
        let _guard = span.enter();
        self.cache.clear();

        let role = self
            .role_of(&source_file)
            .ok_or_else(|| Error::UnsupportedFile {
                path: source_file.clone(),
            })?;
        let build_file = self.build_file_for(&source_file)?;
        let target = TargetFile::new(
            relative_path(&source_file, parent_dir(&build_file)).unwrap_or_default(),
            role,
        );
        let own_rule = match self.rule_name_for(&build_file, &target) {
            // The writer recreates an unparsable file, so the new rule's name applies
            Err(Error::FailedPrecondition { .. }) => self.created_rule_name(&target),
            other => other?,
        };
        debug!("{:?} belongs to {} in {:?}", source_file, own_rule, build_file);

        let imports = match SourceKind::from_path(&source_file) {
            Some(kind) => {
                let text = std::fs::read_to_string(&source_file)?;
                self.extractor.extract_imports(&text, kind)
            }
            None => Vec::new(),
        };

        let mut status = TaskStatus::Processing;
        let mut labels = Vec::new();
        let mut unresolved = Vec::new();
        let mut failures = Vec::new();

        for import in imports {
            let resolution = self.resolver.resolve(&import, &source_file);
            if !resolution.is_resolved() {
                let hint = Error::UnresolvedImport {
                    import: import.clone(),
                    from: source_file.clone(),
                }
                .to_string();
                debug!("{}", hint);
                unresolved.push(UnresolvedDependency { import, hint });
                status = status.transition(TaskStatus::PartialSuccess);
                continue;
            }

            match self.dependency_for(&resolution.resolved_path, &build_file) {
                Ok(dependency) => {
                    let is_self = dependency.owning_file_path == dependency.target_file_path
                        && dependency.rule_name == own_rule;
                    if is_self {
                        debug!("Skipping self dependency on {}", import);
                    } else {
                        labels.push(dependency.to_target(self.config.canonical_labels));
                    }
                }
                Err(e) => {
                    warn!("Cannot depend on '{}': {}", import, e);
                    failures.push(format!("{import}: {e}"));
                    status = status.transition(TaskStatus::Failed);
                }
            }
        }

        let dependencies = sort_targets(labels);
        let outcome = self
            .writer
            .write(&mut self.cache, &build_file, &target, &dependencies)?;
        status = status.transition(outcome.status);
        if let Some(reason) = &outcome.reason {
            failures.push(reason.clone());
        }
        info!(
            "Synced {:?}: {} via {} ({} deps)",
            source_file,
            status,
            outcome.strategy,
            dependencies.len()
        );

        Ok(SyncReport {
            source_file,
            build_file,
            outcome: Some(outcome),
            dependencies,
            unresolved,
            failures,
            status,
        })
    }

    /// Managed rules of a declaration file
    pub fn inspect(&mut self, build_file: &Path) -> Result<Vec<RuleSummary>> {
        let parsed = self.cache.get_or_parse(build_file)?;
        if parsed.output.has_errors() {
            return Err(Error::FailedPrecondition {
                path: build_file.to_path_buf(),
                errors: parsed.output.errors,
            });
        }
        Ok(summarize_rules(&parsed.output.root, self.config.clone()))
    }

    /// Managed rules of a declaration file as pretty JSON
    pub fn inspect_json(&mut self, build_file: &Path) -> Result<String> {
        let rules = self.inspect(build_file)?;
        Ok(serde_json::to_string_pretty(&rules)?)
    }

    /// Canonical form of a declaration file
    pub fn format(&mut self, build_file: &Path) -> Result<FormatReport> {
        let source = std::fs::read_to_string(build_file)?;
        Ok(format_source(build_file, &source, &self.config))
    }

    fn build_file_for(&self, path: &Path) -> Result<PathBuf> {
        self.locator
            .locate(path)
            .or_else(|| self.locator.default_location(path))
            .ok_or_else(|| {
                Error::Other(format!(
                    "no place for a declaration file of {}; check build_file_names",
                    path.display()
                ))
            })
    }

    /// Label parts for a resolved import file or package directory
    fn dependency_for(&mut self, resolved: &Path, owning_build_file: &Path) -> Result<Dependency> {
        let target_build_file = self.build_file_for(resolved)?;
        let rule_name = if resolved.is_dir() {
            resolved
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            let role = self.role_of(resolved).unwrap_or(FileRole::Module);
            let target = TargetFile::new(
                relative_path(resolved, parent_dir(&target_build_file)).unwrap_or_default(),
                role,
            );
            self.rule_name_for(&target_build_file, &target)?
        };
        Ok(Dependency::new(
            rule_name,
            self.label_path(owning_build_file),
            self.label_path(&target_build_file),
            self.root_dir_name.clone(),
        ))
    }

    /// Name of the rule owning `target`, or the name a created rule would get
    fn rule_name_for(&mut self, build_file: &Path, target: &TargetFile) -> Result<String> {
        let fallback = self.created_rule_name(target);
        if !build_file.is_file() {
            return Ok(fallback);
        }

        let parsed = self.cache.get_or_parse(build_file)?;
        if parsed.output.has_errors() {
            return Err(Error::FailedPrecondition {
                path: build_file.to_path_buf(),
                errors: parsed.output.errors,
            });
        }
        let ctx = VisitContext::new(self.config.clone(), target.clone());
        let result = RuleNameVisitor.visit(&parsed.output.root, &ctx);
        match (result.status, result.value) {
            (TaskStatus::Success, Some(name)) => Ok(name),
            (_, _) => {
                debug!(
                    "{:?}: {}; assuming {}",
                    build_file,
                    result.reason.unwrap_or_default(),
                    fallback
                );
                Ok(fallback)
            }
        }
    }

    fn created_rule_name(&self, target: &TargetFile) -> String {
        let template = self.config.on_create.template(target.role);
        format_target_name(&template.target_format, &target.relative_path)
    }

    /// `root_dir_name/relative/path` form used for labels
    fn label_path(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix(&self.workspace_root).unwrap_or(path);
        Path::new(&self.root_dir_name).join(relative)
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

/// `/` separated path of `path` below `base`
fn relative_path(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn runner(root: &Path) -> AutoDepsRunner {
        let loaded = LoadedConfig {
            config: Config::default(),
            sources: Vec::new(),
            workspace_root: root.to_path_buf(),
        };
        AutoDepsRunner::new(loaded).unwrap()
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/ws/src/a.ts"), Path::new("/ws")),
            Some("src/a.ts".to_string())
        );
        assert_eq!(relative_path(Path::new("/other/a.ts"), Path::new("/ws")), None);
    }

    #[test]
    fn test_unsupported_file_names_matchers() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.md");
        fs::write(&file, "hi").unwrap();

        let err = runner(temp.path()).sync_file(&file).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFile { .. }));
        assert!(err.to_string().contains("match.module"));
    }

    #[test]
    fn test_is_build_file() {
        let temp = TempDir::new().unwrap();
        let runner = runner(temp.path());
        assert!(runner.is_build_file(Path::new("pkg/BUILD")));
        assert!(runner.is_build_file(Path::new("BUILD.plz")));
        assert!(!runner.is_build_file(Path::new("pkg/app.ts")));
    }
}
