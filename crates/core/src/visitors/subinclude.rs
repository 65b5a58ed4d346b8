//! Order-stable merging of `subinclude(...)` labels

use crate::builder::string_literal;
use crate::lang::{CallExpression, Root, choose_layout};

/// First top-level `subinclude(...)` call
pub fn find_subinclude_mut(root: &mut Root) -> Option<&mut CallExpression> {
    root.statements
        .iter_mut()
        .find_map(|s| s.as_call_mut().filter(|c| c.function_name() == Some("subinclude")))
}

/// Append the labels of `required` the call does not include yet.
/// Existing labels keep their order. Returns whether the call changed.
pub fn merge_subinclude(call: &mut CallExpression, required: &[String]) -> bool {
    let mut present: Vec<String> = call
        .positional_arguments()
        .filter_map(|e| e.as_string().map(|s| s.value()))
        .collect();

    let mut changed = false;
    for label in required {
        if present.contains(label) {
            continue;
        }
        call.arguments.items.push(string_literal(label));
        present.push(label.clone());
        changed = true;
    }

    if changed && !call.arguments.layout.multiline {
        call.arguments.layout = choose_layout(&call.arguments, 0, "subinclude".len(), false);
    }
    changed
}
