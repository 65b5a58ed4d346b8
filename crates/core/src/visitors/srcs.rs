use crate::config::Field;
use crate::lang::Root;
use crate::qualifier::FieldValue;

use super::{NO_MANAGED_RULE, VisitContext, VisitResult, Visitor, find_target_rule};

/// Reads the typed `srcs` value of the rule owning the target file
#[derive(Debug, Default)]
pub struct SrcsFieldVisitor;

impl Visitor for SrcsFieldVisitor {
    type Output = FieldValue;

    fn visit(&mut self, root: &Root, ctx: &VisitContext) -> VisitResult<FieldValue> {
        let _guard = ctx.span.enter();
        let call = find_target_rule(root, &ctx.qualifier).and_then(|idx| root.statements[idx].as_call());
        match call.and_then(|c| ctx.qualifier.get_field_literal(c, Field::Srcs)) {
            Some(value) => VisitResult::success(value),
            None => VisitResult::failed(NO_MANAGED_RULE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::lang::parse_source;
    use crate::patterns::FileRole;
    use crate::qualifier::{GlobValue, TargetFile};
    use std::sync::Arc;

    #[test]
    fn test_reads_glob_srcs() {
        let root = parse_source("ts_library(\n    name = \"pkg\",\n    srcs = glob([\"src/**/*.ts\"], [\"**/*.d.ts\"]),\n)\n").root;
        let ctx = VisitContext::new(
            Arc::new(Config::default()),
            TargetFile::new("src/a/b.ts", FileRole::Module),
        );
        let result = SrcsFieldVisitor.visit(&root, &ctx);
        assert_eq!(
            result.value,
            Some(FieldValue::Glob(GlobValue {
                include: vec!["src/**/*.ts".to_string()],
                exclude: vec!["**/*.d.ts".to_string()],
            }))
        );
    }

    #[test]
    fn test_missing_rule_fails() {
        let ctx = VisitContext::new(
            Arc::new(Config::default()),
            TargetFile::new("x.ts", FileRole::Module),
        );
        let result = SrcsFieldVisitor.visit(&parse_source("").root, &ctx);
        assert!(result.value.is_none());
        assert_eq!(result.reason.as_deref(), Some(NO_MANAGED_RULE));
    }
}
