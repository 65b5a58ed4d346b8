use regex::Regex;

use crate::error::{Error, Result};
use crate::interfaces::{ImportExtractor, SourceKind};

/// ES module and CommonJS import scanning with regular expressions.
///
/// Handles `import ... from`, side-effect `import "x"`, `export ... from`,
/// `require("x")` and dynamic `import("x")`. TypeScript files also yield
/// `/// <reference path="..." />` targets.
pub struct RegexImportExtractor {
    imports: Regex,
    references: Regex,
    block_comments: Regex,
    line_comments: Regex,
}

impl RegexImportExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            imports: compile(
                r#"(?:\bfrom|\bimport\s*\(?|\brequire\s*\()\s*['"]([^'"\n]+)['"]"#,
            )?,
            references: compile(r#"(?m)^\s*///\s*<reference\s+path\s*=\s*['"]([^'"\n]+)['"]"#)?,
            block_comments: compile(r"(?s)/\*.*?\*/")?,
            line_comments: compile(r"(?m)^\s*//.*$")?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::PatternError(e.to_string()))
}

impl ImportExtractor for RegexImportExtractor {
    fn extract_imports(&self, text: &str, kind: SourceKind) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut push = |specifier: &str| {
            if !found.iter().any(|f| f == specifier) {
                found.push(specifier.to_string());
            }
        };

        if kind == SourceKind::TypeScript {
            for capture in self.references.captures_iter(text) {
                push(&capture[1]);
            }
        }

        let code = self.block_comments.replace_all(text, "");
        let code = self.line_comments.replace_all(&code, "");
        for capture in self.imports.captures_iter(&code) {
            push(&capture[1]);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_every_import_form_once() {
        let source = r#"
import { a, b } from "./ab";
import type { T } from '../types';
import "./side-effect";
export * from "./reexport";
const lazy = await import("./lazy");
const fs = require('fs');
import {
    multi,
    line,
} from "@app/multi";
import again from "./ab";
"#;
        let extractor = RegexImportExtractor::new().unwrap();
        assert_eq!(
            extractor.extract_imports(source, SourceKind::TypeScript),
            vec![
                "./ab",
                "../types",
                "./side-effect",
                "./reexport",
                "./lazy",
                "fs",
                "@app/multi"
            ]
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let source = "// import x from './commented'\n/* require('./blocked') */\nimport y from './real';\n";
        let extractor = RegexImportExtractor::new().unwrap();
        assert_eq!(
            extractor.extract_imports(source, SourceKind::JavaScript),
            vec!["./real"]
        );
    }

    #[test]
    fn test_reference_paths_only_for_typescript() {
        let source = "/// <reference path=\"./globals.d.ts\" />\nimport a from './a';\n";
        let extractor = RegexImportExtractor::new().unwrap();
        assert_eq!(
            extractor.extract_imports(source, SourceKind::TypeScript),
            vec!["./globals.d.ts", "./a"]
        );
        assert_eq!(
            extractor.extract_imports(source, SourceKind::JavaScript),
            vec!["./a"]
        );
    }
}
