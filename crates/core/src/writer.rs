//! Persisting dependency changes into declaration files
//!
//! Strategies are tried in order: update the rule owning the target, append a
//! new rule to the existing file, create the file from scratch. Exactly one
//! strategy's output is written. A file that does not parse is a failed
//! precondition for update and append, so it is created anew.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::builder::Builder;
use crate::cache::AstCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lang::Root;
use crate::qualifier::TargetFile;
use crate::visitors::{
    DependencyUpdateVisitor, RuleInsertionVisitor, TaskStatus, VisitContext, VisitResult, Visitor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStrategy {
    Update,
    Append,
    Create,
}

impl WriteStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteStrategy::Update => "update",
            WriteStrategy::Append => "append",
            WriteStrategy::Create => "create",
        }
    }
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one write did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteOutcome {
    pub strategy: WriteStrategy,
    pub path: PathBuf,
    /// Whether the file content changed on disk
    pub changed: bool,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub struct Writer {
    config: Arc<Config>,
}

impl Writer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Make `build_file` declare `deps` for the rule owning `target`.
    ///
    /// A declaration file that does not parse is replaced by a new file; the
    /// outcome is then a partial success carrying the parse errors.
    pub fn write(
        &self,
        cache: &mut AstCache,
        build_file: &Path,
        target: &TargetFile,
        deps: &[String],
    ) -> Result<WriteOutcome> {
        let ctx = VisitContext::new(self.config.clone(), target.clone());

        if !build_file.exists() {
            let root = Builder::new(&self.config, target).build_new_file(deps, target.role);
            return self.persist(cache, build_file, WriteStrategy::Create, &root, None);
        }

        let parsed = cache.get_or_parse(build_file)?;
        if parsed.output.has_errors() {
            let precondition = Error::FailedPrecondition {
                path: build_file.to_path_buf(),
                errors: parsed.output.errors,
            };
            warn!("{}; creating it anew", precondition);
            let root = Builder::new(&self.config, target).build_new_file(deps, target.role);
            let mut outcome = self.persist(
                cache,
                build_file,
                WriteStrategy::Create,
                &root,
                Some(&parsed.source),
            )?;
            outcome.status = TaskStatus::PartialSuccess;
            outcome.reason = Some(precondition.to_string());
            return Ok(outcome);
        }
        let root = parsed.output.root;

        let update = DependencyUpdateVisitor::new(deps.to_vec()).visit(&root, &ctx);
        debug!("Update of {:?}: {}", build_file, update.status);
        if update.status != TaskStatus::Passthrough {
            return self.finish(
                cache,
                build_file,
                WriteStrategy::Update,
                update,
                &root,
                &parsed.source,
            );
        }

        let append = RuleInsertionVisitor::new(deps.to_vec(), target.role).visit(&root, &ctx);
        debug!("Append to {:?}: {}", build_file, append.status);
        self.finish(
            cache,
            build_file,
            WriteStrategy::Append,
            append,
            &root,
            &parsed.source,
        )
    }

    fn finish(
        &self,
        cache: &mut AstCache,
        path: &Path,
        strategy: WriteStrategy,
        result: VisitResult<Root>,
        original: &Root,
        source: &str,
    ) -> Result<WriteOutcome> {
        match (result.status, result.value) {
            (TaskStatus::Success, Some(root)) => {
                self.persist(cache, path, strategy, &root, Some(source))
            }
            (TaskStatus::Failed, _) => Ok(WriteOutcome {
                strategy,
                path: path.to_path_buf(),
                changed: false,
                status: TaskStatus::Failed,
                reason: result.reason,
            }),
            (status, _) => Err(Error::Internal {
                message: format!("{strategy} of {} ended as {status} without a tree", path.display()),
                snippet: original.to_source(),
            }),
        }
    }

    fn persist(
        &self,
        cache: &mut AstCache,
        path: &Path,
        strategy: WriteStrategy,
        root: &Root,
        previous: Option<&str>,
    ) -> Result<WriteOutcome> {
        let text = root.to_source();
        let changed = previous != Some(text.as_str());
        if changed {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &text)?;
            cache.invalidate(path);
            info!("{} {}", strategy, path.display());
        } else {
            debug!("{} already up to date", path.display());
        }
        Ok(WriteOutcome {
            strategy,
            path: path.to_path_buf(),
            changed,
            status: TaskStatus::Success,
            reason: None,
        })
    }
}
