//! Schema-driven questions about rule calls: is a call managed, does it own
//! the target file, what typed value does a logical field hold

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::config::{Config, Field, FieldEntry, FieldType};
use crate::lang::{CallExpression, Expression, ExpressionKind};
use crate::patterns::{FileRole, GlobPattern};

/// The source file being synced, as seen from its declaration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    /// Path relative to the declaration file's directory, `/` separated
    pub relative_path: String,
    pub role: FileRole,
}

impl TargetFile {
    pub fn new(relative_path: impl Into<String>, role: FileRole) -> Self {
        let relative_path: String = relative_path.into();
        let relative_path = relative_path.replace('\\', "/");
        let relative_path = relative_path
            .strip_prefix("./")
            .map(str::to_string)
            .unwrap_or(relative_path);
        Self {
            relative_path,
            role,
        }
    }
}

/// `glob(include = [...], exclude = [...])` arguments
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GlobValue {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Typed value of a managed field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    String(String),
    Array(Vec<String>),
    Glob(GlobValue),
    Bool(bool),
    Number(i64),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::String(_) => FieldType::String,
            FieldValue::Array(_) => FieldType::Array,
            FieldValue::Glob(_) => FieldType::Glob,
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::Number(_) => FieldType::Number,
        }
    }
}

/// Read `expr` as `as_type`; `None` when the expression holds another type
pub fn literal_of(expr: &Expression, as_type: FieldType) -> Option<FieldValue> {
    match (as_type, &expr.kind) {
        (FieldType::String, ExpressionKind::String(s)) => Some(FieldValue::String(s.value())),
        (FieldType::Array, ExpressionKind::Array(array)) => {
            Some(FieldValue::Array(array.string_values()))
        }
        (FieldType::Glob, ExpressionKind::Call(call)) if call.function_name() == Some("glob") => {
            Some(FieldValue::Glob(glob_value(call)))
        }
        (FieldType::Bool, ExpressionKind::Boolean(b)) => Some(FieldValue::Bool(b.value())),
        (FieldType::Number, ExpressionKind::Integer(i)) => i.value().map(FieldValue::Number),
        _ => None,
    }
}

fn glob_value(call: &CallExpression) -> GlobValue {
    let mut positional = call.positional_arguments();
    let include = call
        .keyword_argument("include")
        .or_else(|| positional.next())
        .and_then(|e| e.as_array())
        .map(|a| a.string_values())
        .unwrap_or_default();
    let exclude = call
        .keyword_argument("exclude")
        .or_else(|| positional.next())
        .and_then(|e| e.as_array())
        .map(|a| a.string_values())
        .unwrap_or_default();
    GlobValue { include, exclude }
}

#[derive(Debug, Clone)]
pub struct NodeQualifier {
    config: Arc<Config>,
    target: Option<TargetFile>,
}

impl NodeQualifier {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            target: None,
        }
    }

    pub fn with_target(config: Arc<Config>, target: TargetFile) -> Self {
        Self {
            config,
            target: Some(target),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn target(&self) -> Option<&TargetFile> {
        self.target.as_ref()
    }

    /// Managed rules, builtins, and the rule kind created for the target's role
    pub fn is_managed_node(&self, call: &CallExpression) -> bool {
        let Some(name) = call.function_name() else {
            return false;
        };
        if self.config.is_managed_rule(name) {
            return true;
        }
        self.target
            .as_ref()
            .is_some_and(|t| self.config.on_create.template(t.role).name == name)
    }

    /// Whether a managed rule lists the target file in one of its `srcs` aliases.
    ///
    /// Glob `exclude` patterns are not consulted; a file matched by `include`
    /// counts as owned.
    pub fn is_target_build_rule(&self, call: &CallExpression) -> bool {
        let Some(target) = &self.target else {
            return false;
        };
        let Some(rule) = call.function_name() else {
            return false;
        };
        if !self.is_managed_node(call) || rule == "glob" || rule == "subinclude" {
            return false;
        }

        self.typed_fields(call, Field::Srcs)
            .iter()
            .any(|(_, value)| match value {
                FieldValue::String(src) => normalize(src) == target.relative_path,
                FieldValue::Array(srcs) => srcs.iter().any(|s| normalize(s) == target.relative_path),
                FieldValue::Glob(glob) => glob.include.iter().any(|pattern| {
                    GlobPattern::new(pattern)
                        .map(|g| g.is_match(&target.relative_path))
                        .unwrap_or_else(|e| {
                            warn!("Ignoring glob pattern in {}: {}", rule, e);
                            false
                        })
                }),
                FieldValue::Bool(_) | FieldValue::Number(_) => false,
            })
    }

    /// Value of the first declared alias of `field` holding its declared type
    pub fn get_field_literal(&self, call: &CallExpression, field: Field) -> Option<FieldValue> {
        self.typed_fields(call, field)
            .into_iter()
            .next()
            .map(|(_, value)| value)
    }

    /// Position and alias of the keyword argument holding `field`
    pub fn find_field_argument(
        &self,
        call: &CallExpression,
        field: Field,
    ) -> Option<(usize, FieldEntry)> {
        let schema = self.config.schema_for(call.function_name()?);
        schema.entries(field).into_iter().find_map(|entry| {
            call.keyword_arguments()
                .find(|(_, key, _)| *key == entry.value)
                .map(|(idx, _, _)| (idx, entry.clone()))
        })
    }

    /// Declared aliases of `field` present on the call with a value of the
    /// declared type, in schema order. Aliases holding another type are warned about.
    fn typed_fields(&self, call: &CallExpression, field: Field) -> Vec<(FieldEntry, FieldValue)> {
        let Some(rule) = call.function_name() else {
            return Vec::new();
        };
        let entries = self.config.schema_for(rule).entries(field);
        let mut found = Vec::new();
        let mut mismatched: Vec<(&str, &Expression)> = Vec::new();

        for entry in &entries {
            let Some(expr) = call.keyword_argument(&entry.value) else {
                continue;
            };
            match literal_of(expr, entry.as_type) {
                Some(value) => found.push((entry.clone(), value)),
                None if !mismatched.iter().any(|(key, _)| *key == entry.value) => {
                    mismatched.push((&entry.value, expr))
                }
                None => {}
            }
        }

        for (key, expr) in mismatched {
            if !found.iter().any(|(entry, _)| entry.value == key) {
                warn!(
                    "Field '{}' of {} holds {}, which no alias of '{}' declares; ignoring it",
                    key,
                    rule,
                    expr.kind_name(),
                    field.as_str()
                );
            }
        }
        found
    }
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").map(str::to_string).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::parse_source;
    use serde_json::json;

    fn qualifier(config: Config, path: &str, role: FileRole) -> NodeQualifier {
        NodeQualifier::with_target(Arc::new(config), TargetFile::new(path, role))
    }

    fn first_call(source: &str) -> CallExpression {
        let output = parse_source(source);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        output.root.calls().next().unwrap().1.clone()
    }

    #[test]
    fn test_is_managed_node() {
        let q = qualifier(Config::default(), "a.ts", FileRole::Module);
        assert!(q.is_managed_node(&first_call("ts_library(name = \"a\")")));
        assert!(q.is_managed_node(&first_call("subinclude(\"//x\")")));
        assert!(!q.is_managed_node(&first_call("genrule(name = \"g\")")));
    }

    #[test]
    fn test_srcs_array_and_string() {
        let q = qualifier(Config::default(), "src/a.ts", FileRole::Module);
        assert!(q.is_target_build_rule(&first_call(
            "ts_library(name = \"a\", srcs = [\"./src/a.ts\", \"b.ts\"])"
        )));
        assert!(q.is_target_build_rule(&first_call("ts_library(name = \"a\", src = \"src/a.ts\")")));
        assert!(!q.is_target_build_rule(&first_call(
            "ts_library(name = \"a\", srcs = [\"b.ts\"])"
        )));
    }

    #[test]
    fn test_glob_include_matches() {
        let call = first_call("ts_library(name = \"pkg\", srcs = glob(include = [\"**/*.ts\"]))");
        assert!(qualifier(Config::default(), "pkg/foo.ts", FileRole::Module).is_target_build_rule(&call));
        assert!(!qualifier(Config::default(), "pkg/foo.json", FileRole::Module).is_target_build_rule(&call));

        let positional = first_call("ts_library(name = \"pkg\", srcs = glob([\"*.ts\"]))");
        assert!(qualifier(Config::default(), "foo.ts", FileRole::Module).is_target_build_rule(&positional));
    }

    #[test]
    fn test_glob_exclude_is_not_evaluated() {
        let call = first_call(
            "ts_library(name = \"pkg\", srcs = glob(include = [\"**/*.ts\"], exclude = [\"**/*.test.ts\"]))",
        );
        let q = qualifier(Config::default(), "a.test.ts", FileRole::Test);
        // An excluded file still counts as owned by the glob rule
        assert!(q.is_target_build_rule(&call));
        assert_eq!(
            q.get_field_literal(&call, Field::Srcs),
            Some(FieldValue::Glob(GlobValue {
                include: vec!["**/*.ts".to_string()],
                exclude: vec!["**/*.test.ts".to_string()],
            }))
        );
    }

    #[test]
    fn test_alias_precedence() {
        let mut config = Config::default();
        config.manage.schema.insert(
            "ts_library".to_string(),
            serde_json::from_value(json!({
                "srcs": [
                    {"value": "files", "as": "array"},
                    {"value": "srcs", "as": "array"}
                ]
            }))
            .unwrap(),
        );
        let q = qualifier(config, "a.ts", FileRole::Module);
        let call = first_call("ts_library(name = \"x\", srcs = [\"b.ts\"], files = [\"a.ts\"])");
        assert!(q.is_target_build_rule(&call));
        assert_eq!(
            q.get_field_literal(&call, Field::Srcs),
            Some(FieldValue::Array(vec!["a.ts".to_string()]))
        );
        let (idx, entry) = q.find_field_argument(&call, Field::Srcs).unwrap();
        assert_eq!((idx, entry.value.as_str()), (2, "files"));
    }

    #[test]
    fn test_schema_mismatch_is_a_non_match() {
        let q = qualifier(Config::default(), "a.ts", FileRole::Module);
        let call = first_call("ts_library(name = 1, srcs = SRCS, test_only = True)");
        assert_eq!(q.get_field_literal(&call, Field::Name), None);
        assert!(!q.is_target_build_rule(&call));
        assert_eq!(
            q.get_field_literal(&call, Field::TestOnly),
            Some(FieldValue::Bool(true))
        );
    }

    #[test]
    fn test_field_value_serialization() {
        let value = FieldValue::Array(vec![":a".to_string()]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"type": "array", "value": [":a"]})
        );
    }
}
