//! Canonical formatting of declaration files
//!
//! Formatting keeps every comment and statement and only normalises the
//! layout of managed rule calls: argument lists and their array values are
//! laid out the way newly built rules are.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{BUILTIN_RULES, Config};
use crate::lang::{ParseError, Root, parse_source, relayout_rule_arguments};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatReport {
    pub path: PathBuf,
    /// Whether the canonical text differs from the file
    pub changed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
    /// Canonical text; the original text when the file does not parse
    #[serde(skip)]
    pub formatted: String,
}

/// Relayout every managed rule call of `root`
pub fn canonicalize(root: &mut Root, config: &Config) {
    for statement in &mut root.statements {
        let managed = statement
            .as_call()
            .and_then(|call| call.function_name())
            .is_some_and(|name| config.is_managed_rule(name) && !BUILTIN_RULES.contains(&name));
        if !managed {
            continue;
        }
        statement.forget_source();
        if let Some(call) = statement.as_call_mut() {
            relayout_rule_arguments(&mut call.arguments);
        }
    }
}

pub fn format_source(path: impl Into<PathBuf>, source: &str, config: &Config) -> FormatReport {
    let output = parse_source(source);
    if output.has_errors() {
        return FormatReport {
            path: path.into(),
            changed: false,
            errors: output.errors,
            formatted: source.to_string(),
        };
    }

    let mut root = output.root;
    canonicalize(&mut root, config);
    let formatted = root.to_source();
    FormatReport {
        path: path.into(),
        changed: formatted != source,
        errors: Vec::new(),
        formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_rules_are_relaid_out() {
        let source = "# top\nts_library(name = \"a\", srcs = [\"a.ts\"])  # lib\n\ngenrule(name = \"g\", cmd = \"x\")\n";
        let report = format_source("BUILD", source, &Config::default());
        assert!(report.changed);
        insta::assert_snapshot!(report.formatted.trim_end(), @r#"
        # top
        ts_library(
            name = "a",
            srcs = ["a.ts"],
        )  # lib

        genrule(name = "g", cmd = "x")
        "#);

        let again = format_source("BUILD", &report.formatted, &Config::default());
        assert!(!again.changed);
    }

    #[test]
    fn test_comments_keep_lists_multiline() {
        let source = "filegroup(\n    name = \"f\",\n    srcs = [\n        \"a.json\",  # keep\n    ],\n)\n";
        let report = format_source("BUILD", source, &Config::default());
        assert!(!report.changed, "{}", report.formatted);
    }

    #[test]
    fn test_managed_rule_spacing_is_normalised() {
        let source = "x = [ 1,2 ]\nts_library(\n    name = \"a\",\n    srcs = [ \"a.ts\",\"b.ts\" ],\n)\n";
        let report = format_source("BUILD", source, &Config::default());
        assert!(report.changed);
        assert_eq!(
            report.formatted,
            "x = [ 1,2 ]\nts_library(\n    name = \"a\",\n    srcs = [\"a.ts\", \"b.ts\"],\n)\n"
        );
    }

    #[test]
    fn test_unparsable_source_is_reported() {
        let report = format_source("BUILD", "def f():\n    pass\n", &Config::default());
        assert!(!report.errors.is_empty());
        assert!(!report.changed);
        assert_eq!(report.formatted, "def f():\n    pass\n");
    }
}
