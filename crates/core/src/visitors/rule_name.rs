use crate::config::Field;
use crate::lang::Root;
use crate::qualifier::FieldValue;

use super::{NO_MANAGED_RULE, VisitContext, VisitResult, Visitor, find_target_rule};

/// Finds the `name` of the rule owning the target file
#[derive(Debug, Default)]
pub struct RuleNameVisitor;

impl Visitor for RuleNameVisitor {
    type Output = String;

    fn visit(&mut self, root: &Root, ctx: &VisitContext) -> VisitResult<String> {
        let _guard = ctx.span.enter();
        let Some(call) =
            find_target_rule(root, &ctx.qualifier).and_then(|idx| root.statements[idx].as_call())
        else {
            return VisitResult::failed(NO_MANAGED_RULE);
        };

        match ctx.qualifier.get_field_literal(call, Field::Name) {
            Some(FieldValue::String(name)) => VisitResult::success(name),
            _ => VisitResult::failed(format!(
                "{} owning the file has no string name",
                call.function_name().unwrap_or("rule")
            )),
        }
    }
}
