//! Glob patterns compiled to anchored regular expressions
//!
//! Supported syntax: `*` (within one path segment), `**` (any number of
//! segments), `?`, `[...]` character classes (`[!...]` negated) and `{a,b}`
//! alternatives. Paths are matched with `/` separators.

use regex::Regex;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let source = glob_to_regex(pattern)?;
        let regex = Regex::new(&source)
            .map_err(|e| Error::PatternError(format!("invalid glob '{pattern}': {e}")))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Match a relative path; a leading `./` is ignored
    pub fn is_match(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let normalized = normalized.strip_prefix("./").unwrap_or(&normalized);
        self.regex.is_match(normalized)
    }
}

impl PartialEq for GlobPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// A set of patterns matching when any of them does
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobSet {
    patterns: Vec<GlobPattern>,
}

impl GlobSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| GlobPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }
}

fn glob_to_regex(pattern: &str) -> Result<String> {
    let invalid = |reason: &str| Error::PatternError(format!("invalid glob '{pattern}': {reason}"));

    let trimmed = pattern.strip_prefix("./").unwrap_or(pattern);
    let chars: Vec<char> = trimmed.chars().collect();
    let mut regex = String::from("^");
    let mut brace_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let at_segment_start = i == 0 || chars[i - 1] == '/';
                if at_segment_start && chars.get(i + 2) == Some(&'/') {
                    regex.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    regex.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| invalid("unterminated character class"))?;
                let mut class: String = chars[i + 1..close].iter().collect();
                if let Some(rest) = class.strip_prefix('!') {
                    class = format!("^{rest}");
                }
                if class.is_empty() {
                    return Err(invalid("empty character class"));
                }
                regex.push('[');
                regex.push_str(&class.replace('\\', "\\\\"));
                regex.push(']');
                i = close + 1;
                continue;
            }
            '{' => {
                brace_depth += 1;
                regex.push_str("(?:");
            }
            ',' if brace_depth > 0 => regex.push('|'),
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                regex.push(')');
            }
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }

    if brace_depth > 0 {
        return Err(invalid("unbalanced '{'"));
    }
    regex.push('$');
    Ok(regex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_star_matches_nested_and_top_level() {
        let glob = GlobPattern::new("**/*.ts").unwrap();
        assert!(glob.is_match("pkg/foo.ts"));
        assert!(glob.is_match("foo.ts"));
        assert!(glob.is_match("a/b/c/foo.ts"));
        assert!(!glob.is_match("pkg/foo.json"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let glob = GlobPattern::new("*.ts").unwrap();
        assert!(glob.is_match("foo.ts"));
        assert!(glob.is_match("./foo.ts"));
        assert!(!glob.is_match("pkg/foo.ts"));
    }

    #[test]
    fn test_directory_wildcard() {
        let glob = GlobPattern::new("**/__fixtures__/**").unwrap();
        assert!(glob.is_match("src/__fixtures__/data.json"));
        assert!(glob.is_match("__fixtures__/deep/data.json"));
        assert!(!glob.is_match("src/fixtures/data.json"));
    }

    #[test]
    fn test_classes_and_alternatives() {
        let glob = GlobPattern::new("src/[!_]*.{ts,tsx}").unwrap();
        assert!(glob.is_match("src/app.tsx"));
        assert!(glob.is_match("src/app.ts"));
        assert!(!glob.is_match("src/_private.ts"));
        assert!(!glob.is_match("src/app.js"));

        let single = GlobPattern::new("file?.ts").unwrap();
        assert!(single.is_match("file1.ts"));
        assert!(!single.is_match("file10.ts"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(GlobPattern::new("src/[abc").is_err());
        assert!(GlobPattern::new("{a,b").is_err());
        assert!(GlobPattern::new("[]").is_err());
    }

    #[test]
    fn test_glob_set() {
        let set = GlobSet::new(&["**/*.test.ts", "**/*.spec.ts"]).unwrap();
        assert!(set.is_match("a/b.spec.ts"));
        assert!(!set.is_match("a/b.ts"));
        assert!(GlobSet::default().is_empty());
    }
}
