//! Tree-rewriting visitors
//!
//! Visitors take the parsed tree by reference and report a [`VisitResult`];
//! rewriting visitors return a new tree and never touch the input.

pub mod deps_update;
pub mod rule_insert;
pub mod rule_name;
pub mod srcs;
pub mod status;
pub mod subinclude;

use std::sync::Arc;

use tracing::Span;

use crate::config::Config;
use crate::lang::Root;
use crate::qualifier::{NodeQualifier, TargetFile};

pub use deps_update::DependencyUpdateVisitor;
pub use rule_insert::RuleInsertionVisitor;
pub use rule_name::RuleNameVisitor;
pub use srcs::SrcsFieldVisitor;
pub use status::TaskStatus;

/// Reason reported when no rule in the file owns the target
pub const NO_MANAGED_RULE: &str = "no managed rule found";

/// Everything a visitor needs besides the tree
#[derive(Debug, Clone)]
pub struct VisitContext {
    pub config: Arc<Config>,
    pub qualifier: NodeQualifier,
    pub span: Span,
}

impl VisitContext {
    pub fn new(config: Arc<Config>, target: TargetFile) -> Self {
        let span = tracing::debug_span!(
            "visit",
            file = %target.relative_path,
            role = %target.role
        );
        Self {
            qualifier: NodeQualifier::with_target(config.clone(), target),
            config,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitResult<T> {
    pub status: TaskStatus,
    pub reason: Option<String>,
    pub value: Option<T>,
}

impl<T> VisitResult<T> {
    pub fn success(value: T) -> Self {
        Self {
            status: TaskStatus::Success,
            reason: None,
            value: Some(value),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            reason: Some(reason.into()),
            value: None,
        }
    }

    /// Nothing applicable in this tree
    pub fn passthrough(reason: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Passthrough,
            reason: Some(reason.into()),
            value: None,
        }
    }
}

pub trait Visitor {
    type Output;

    fn visit(&mut self, root: &Root, ctx: &VisitContext) -> VisitResult<Self::Output>;
}

/// Index of the first top-level managed rule owning the target file
pub fn find_target_rule(root: &Root, qualifier: &NodeQualifier) -> Option<usize> {
    root.calls()
        .find(|(_, call)| qualifier.is_managed_node(call) && qualifier.is_target_build_rule(call))
        .map(|(idx, _)| idx)
}
