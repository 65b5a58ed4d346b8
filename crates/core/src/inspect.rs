//! Summaries of the managed rules in a declaration file

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{BUILTIN_RULES, Config, Field};
use crate::lang::Root;
use crate::qualifier::{FieldValue, NodeQualifier};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSummary {
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 1-based line of the rule call
    pub line: usize,
    /// Typed values of the managed fields present, keyed by logical field name
    pub fields: BTreeMap<String, FieldValue>,
}

/// Every managed rule call at the top level of `root`, in file order
pub fn summarize_rules(root: &Root, config: Arc<Config>) -> Vec<RuleSummary> {
    let qualifier = NodeQualifier::new(config);
    root.calls()
        .filter(|(_, call)| qualifier.is_managed_node(call))
        .filter_map(|(_, call)| {
            let rule = call.function_name()?;
            if BUILTIN_RULES.contains(&rule) {
                return None;
            }
            let name = match qualifier.get_field_literal(call, Field::Name) {
                Some(FieldValue::String(name)) => Some(name),
                _ => None,
            };
            let fields = Field::ALL
                .into_iter()
                .filter(|field| *field != Field::Name)
                .filter_map(|field| {
                    qualifier
                        .get_field_literal(call, field)
                        .map(|value| (field.as_str().to_string(), value))
                })
                .collect();
            Some(RuleSummary {
                rule: rule.to_string(),
                name,
                line: call.function.token().line,
                fields,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::parse_source;

    #[test]
    fn test_lists_managed_rules_only() {
        let source = r#"subinclude("//defs")

genrule(name = "gen", srcs = ["a.txt"])

ts_library(
    name = "app",
    srcs = ["app.ts", "util.ts"],
    deps = [":types"],
)

ts_test(name = "app_test", srcs = glob(["*.test.ts"]), test_only = True)
"#;
        let root = parse_source(source).root;
        let rules = summarize_rules(&root, Arc::new(Config::default()));
        assert_eq!(rules.len(), 2);

        assert_eq!(rules[0].rule, "ts_library");
        assert_eq!(rules[0].name.as_deref(), Some("app"));
        assert_eq!(rules[0].line, 5);
        assert_eq!(
            rules[0].fields.get("deps"),
            Some(&FieldValue::Array(vec![":types".to_string()]))
        );

        let test = &rules[1];
        assert!(matches!(test.fields.get("srcs"), Some(FieldValue::Glob(_))));
        assert_eq!(test.fields.get("test_only"), Some(&FieldValue::Bool(true)));
        assert!(!test.fields.contains_key("deps"));
    }
}
