use tracing::debug;

use crate::builder::{array_literal, build_value, keyword_argument, string_literal};
use crate::config::{Config, Field};
use crate::lang::render::INDENT;
use crate::lang::{ArrayLiteral, CallExpression, ExpressionKind, ListLayout, Render, Root, choose_layout};
use crate::qualifier::{FieldValue, NodeQualifier};

use super::subinclude::{find_subinclude_mut, merge_subinclude};
use super::{NO_MANAGED_RULE, VisitContext, VisitResult, Visitor, find_target_rule};

/// Rewrites the `deps` of the rule owning the target file.
///
/// Elements whose value survives keep their comments; a missing `deps`
/// argument is inserted after `srcs`. Configured update subincludes are merged
/// into an existing `subinclude(...)` call.
#[derive(Debug)]
pub struct DependencyUpdateVisitor {
    deps: Vec<String>,
}

impl DependencyUpdateVisitor {
    pub fn new(deps: Vec<String>) -> Self {
        Self { deps }
    }
}

impl Visitor for DependencyUpdateVisitor {
    type Output = Root;

    fn visit(&mut self, root: &Root, ctx: &VisitContext) -> VisitResult<Root> {
        let _guard = ctx.span.enter();
        let Some(idx) = find_target_rule(root, &ctx.qualifier) else {
            return VisitResult::passthrough(NO_MANAGED_RULE);
        };

        let mut updated = root.clone();
        if !ctx.config.on_update.subinclude.is_empty()
            && let Some(call) = find_subinclude_mut(&mut updated)
            && merge_subinclude(call, &ctx.config.on_update.subinclude)
        {
            debug!("Merged update subincludes");
        }

        let Some(rule) = updated.statements[idx].as_call_mut() else {
            return VisitResult::failed(format!(
                "statement {idx} stopped being a call: {}",
                root.statements[idx].render_string(0)
            ));
        };
        match update_deps(rule, &self.deps, &ctx.qualifier, &ctx.config) {
            Ok(true) => debug!("Rewrote deps: {:?}", self.deps),
            Ok(false) => debug!("Deps already up to date"),
            Err(reason) => return VisitResult::failed(reason),
        }
        VisitResult::success(updated)
    }
}

/// Replace or insert the deps argument of `rule`; `Ok(false)` when nothing changed
fn update_deps(
    rule: &mut CallExpression,
    deps: &[String],
    qualifier: &NodeQualifier,
    config: &Config,
) -> Result<bool, String> {
    let rule_name = rule.function_name().unwrap_or("rule").to_string();

    if let Some((idx, entry)) = qualifier.find_field_argument(rule, Field::Deps) {
        let Some((_, value)) = rule.arguments.items[idx].as_keyword_argument_mut() else {
            return Err(format!("deps argument of {rule_name} is not a keyword argument"));
        };
        let kind_name = value.kind_name();
        let ExpressionKind::Array(array) = &mut value.kind else {
            return Err(format!(
                "'{}' of {rule_name} is {kind_name} rather than an array literal; \
                 write it as a list or map another alias under manage.schema",
                entry.value
            ));
        };
        let prefix = INDENT.len() + entry.value.len() + 3;
        return Ok(replace_elements(array, deps, prefix));
    }

    if deps.is_empty() && config.on_update.omit_empty_fields {
        return Ok(false);
    }

    let schema = config.schema_for(&rule_name);
    let entry = schema.primary(Field::Deps);
    let mut value = build_value(entry.as_type, &FieldValue::Array(deps.to_vec()))
        .unwrap_or_else(|| array_literal(deps));
    if let ExpressionKind::Array(array) = &mut value.kind {
        let prefix = INDENT.len() + entry.value.len() + 3;
        array.elements.layout = choose_layout(&array.elements, 1, prefix, false);
    }

    let mut argument = keyword_argument(&entry.value, value);
    let sibling_spacing = rule.arguments.items.iter().find_map(|arg| match &arg.kind {
        ExpressionKind::Infix(infix) if infix.operator() == "=" => Some(infix.spaced),
        _ => None,
    });
    if let (ExpressionKind::Infix(infix), Some(spaced)) = (&mut argument.kind, sibling_spacing) {
        infix.spaced = spaced;
    }

    let position = qualifier
        .find_field_argument(rule, Field::Srcs)
        .or_else(|| qualifier.find_field_argument(rule, Field::Name))
        .map(|(idx, _)| idx + 1)
        .unwrap_or(rule.arguments.items.len());
    rule.arguments.items.insert(position, argument);
    if !rule.arguments.layout.multiline {
        rule.arguments.layout = choose_layout(&rule.arguments, 0, rule_name.len(), true);
    }
    Ok(true)
}

/// Set the string elements of `array` to `deps`, reusing surviving elements
fn replace_elements(array: &mut ArrayLiteral, deps: &[String], prefix_width: usize) -> bool {
    let current: Vec<Option<String>> = array
        .elements
        .items
        .iter()
        .map(|e| e.as_string().map(|s| s.value()))
        .collect();
    let unchanged = current.len() == deps.len()
        && current
            .iter()
            .zip(deps)
            .all(|(old, new)| old.as_deref() == Some(new.as_str()));
    if unchanged {
        return false;
    }

    let mut remaining = std::mem::take(&mut array.elements.items);
    let mut items = Vec::with_capacity(deps.len());
    for dep in deps {
        let reused = remaining
            .iter()
            .position(|e| e.as_string().is_some_and(|s| s.value() == *dep));
        match reused {
            Some(pos) => items.push(remaining.remove(pos)),
            None => items.push(string_literal(dep)),
        }
    }
    for removed in &remaining {
        debug!("Dropping dependency {}", removed.render_string(0));
    }

    if let Some(first) = items.first_mut() {
        first.blank_lines_before = 0;
    }
    array.elements.items = items;
    if array.elements.items.is_empty() {
        array.elements.layout = ListLayout::inline();
    } else if !array.elements.layout.multiline {
        array.elements.layout = choose_layout(&array.elements, 1, prefix_width, false);
    }
    true
}
