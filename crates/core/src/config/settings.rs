use crate::error::{Error, Result};
use crate::patterns::{FileRole, GlobSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::schema::ManagedSchema;

/// Builtin calls every file may contain
pub const BUILTIN_RULES: &[&str] = &["glob", "subinclude"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Directory name of the workspace root, used to derive package paths.
    /// Defaults to the name of the directory holding the outermost config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir_name: Option<String>,
    /// Declaration file names, most preferred first
    pub build_file_names: Vec<String>,
    pub manage: ManageConfig,
    #[serde(rename = "match")]
    pub matchers: MatchConfig,
    pub on_create: OnCreateConfig,
    pub on_update: OnUpdateConfig,
    pub resolve: ResolveConfig,
    /// Always spell out the rule name in labels (`//pkg/sub:sub`)
    pub canonical_labels: bool,
    /// Parsed declaration files kept per run
    pub cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir_name: None,
            build_file_names: vec!["BUILD".to_string(), "BUILD.plz".to_string()],
            manage: ManageConfig::default(),
            matchers: MatchConfig::default(),
            on_create: OnCreateConfig::default(),
            on_update: OnUpdateConfig::default(),
            resolve: ResolveConfig::default(),
            canonical_labels: false,
            cache_size: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ManageConfig {
    /// Rule kinds the tool reads and rewrites
    pub rules: Vec<String>,
    /// Field aliases per rule kind
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schema: BTreeMap<String, ManagedSchema>,
}

impl Default for ManageConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                "ts_library".to_string(),
                "ts_test".to_string(),
                "filegroup".to_string(),
            ],
            schema: BTreeMap::new(),
        }
    }
}

/// Globs deciding the role of a source file, relative to the workspace root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct MatchConfig {
    pub module: Vec<String>,
    pub test: Vec<String>,
    pub fixture: Vec<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            module: vec!["**/*.ts".to_string(), "**/*.tsx".to_string()],
            test: vec!["**/*.test.ts".to_string(), "**/*.spec.ts".to_string()],
            fixture: vec!["**/__fixtures__/**".to_string()],
        }
    }
}

/// How the `srcs` field of a new rule is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SrcsMode {
    /// List the source file by name
    #[default]
    Explicit,
    /// Use a `glob(...)` call
    Glob,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct GlobMatchers {
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Shape of a rule created for one file role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RuleTemplate {
    /// Rule kind, e.g. `ts_library`
    pub name: String,
    /// Target name template; tokens `<path>`, `<basename>`, `<filename>`, `<firstname>`
    pub target_format: String,
    pub srcs_mode: SrcsMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glob_matchers: Option<GlobMatchers>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub visibility: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_only: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subinclude: Vec<String>,
}

impl Default for RuleTemplate {
    fn default() -> Self {
        Self::named("ts_library", "<firstname>")
    }
}

impl RuleTemplate {
    fn named(name: &str, target_format: &str) -> Self {
        Self {
            name: name.to_string(),
            target_format: target_format.to_string(),
            srcs_mode: SrcsMode::Explicit,
            glob_matchers: None,
            visibility: Vec::new(),
            test_only: None,
            subinclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct OnCreateConfig {
    /// Comment block written at the top of new files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_heading: Option<String>,
    pub omit_empty_fields: bool,
    /// Build definitions every created file subincludes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subinclude: Vec<String>,
    pub module: RuleTemplate,
    pub test: RuleTemplate,
    pub fixture: RuleTemplate,
}

impl Default for OnCreateConfig {
    fn default() -> Self {
        Self {
            file_heading: None,
            omit_empty_fields: true,
            subinclude: Vec::new(),
            module: RuleTemplate::named("ts_library", "<firstname>"),
            test: RuleTemplate::named("ts_test", "<firstname>_test"),
            fixture: RuleTemplate {
                srcs_mode: SrcsMode::Glob,
                glob_matchers: Some(GlobMatchers {
                    include: vec!["**/*".to_string()],
                    exclude: Vec::new(),
                }),
                test_only: Some(true),
                ..RuleTemplate::named("filegroup", "<firstname>_fixture")
            },
        }
    }
}

impl OnCreateConfig {
    pub fn template(&self, role: FileRole) -> &RuleTemplate {
        match role {
            FileRole::Module => &self.module,
            FileRole::Test => &self.test,
            FileRole::Fixture => &self.fixture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct OnUpdateConfig {
    /// Heading placed on files the tool modifies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_heading: Option<String>,
    pub omit_empty_fields: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subinclude: Vec<String>,
}

impl Default for OnUpdateConfig {
    fn default() -> Self {
        Self {
            file_heading: None,
            omit_empty_fields: true,
            subinclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ResolveConfig {
    /// Extensions probed when an import names a file without one
    pub extensions: Vec<String>,
    /// Path aliases, `"@app/*": "src/app/*"`, relative to the workspace root
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
    /// Workspace package names mapped to their directory
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub workspaces: BTreeMap<String, String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                ".ts".to_string(),
                ".tsx".to_string(),
                ".d.ts".to_string(),
                ".js".to_string(),
            ],
            aliases: BTreeMap::new(),
            workspaces: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents + "\n")?;
        Ok(())
    }

    /// Schema for a rule kind, defaults when none is configured
    pub fn schema_for(&self, rule: &str) -> ManagedSchema {
        self.manage.schema.get(rule).cloned().unwrap_or_default()
    }

    /// Whether the tool may read and rewrite calls to `rule`
    pub fn is_managed_rule(&self, rule: &str) -> bool {
        BUILTIN_RULES.contains(&rule)
            || self.manage.rules.iter().any(|r| r == rule)
            || FileRole::ALL
                .iter()
                .any(|role| self.on_create.template(*role).name == rule)
    }

    /// Subincludes a created file needs for `role`, deduplicated in order
    pub fn create_subincludes(&self, role: FileRole) -> Vec<String> {
        let mut includes = self.on_create.subinclude.clone();
        for include in &self.on_create.template(role).subinclude {
            if !includes.contains(include) {
                includes.push(include.clone());
            }
        }
        includes
    }

    pub fn validate(&self) -> Result<()> {
        if self.build_file_names.is_empty() {
            return Err(Error::ConfigError(
                "build_file_names must name at least one file".to_string(),
            ));
        }
        if let Some(empty) = self.build_file_names.iter().find(|n| n.trim().is_empty()) {
            return Err(Error::ConfigError(format!(
                "build_file_names contains an empty name: {empty:?}"
            )));
        }
        if self.manage.rules.iter().any(|r| r.trim().is_empty()) {
            return Err(Error::ConfigError(
                "manage.rules contains an empty rule name".to_string(),
            ));
        }
        for role in FileRole::ALL {
            let template = self.on_create.template(role);
            if template.name.trim().is_empty() {
                return Err(Error::ConfigError(format!(
                    "on_create.{role}.name must not be empty"
                )));
            }
            if template.target_format.trim().is_empty() {
                return Err(Error::ConfigError(format!(
                    "on_create.{role}.target_format must not be empty"
                )));
            }
            if let Some(matchers) = &template.glob_matchers {
                GlobSet::new(&matchers.include)?;
                GlobSet::new(&matchers.exclude)?;
            }
        }
        GlobSet::new(&self.matchers.module)?;
        GlobSet::new(&self.matchers.test)?;
        GlobSet::new(&self.matchers.fixture)?;
        if self.cache_size == 0 {
            return Err(Error::ConfigError(
                "cache_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{Field, FieldType};
    use serde_json::json;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = serde_json::from_value(json!({
            "canonical_labels": true,
            "on_create": {
                "file_heading": "Generated by autodeps",
                "module": {"name": "my_library"}
            }
        }))
        .unwrap();

        assert!(config.canonical_labels);
        assert_eq!(config.build_file_names, vec!["BUILD", "BUILD.plz"]);
        assert_eq!(config.on_create.module.name, "my_library");
        assert_eq!(config.on_create.module.target_format, "<firstname>");
        assert_eq!(config.on_create.test.name, "ts_test");
        assert!(config.on_create.omit_empty_fields);
        assert!(config.is_managed_rule("my_library"));
        assert!(config.is_managed_rule("subinclude"));
        assert!(!config.is_managed_rule("genrule"));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.manage.schema.insert(
            "ts_library".to_string(),
            serde_json::from_value(json!({"srcs": [{"value": "files", "as": "array"}]})).unwrap(),
        );
        config
            .resolve
            .aliases
            .insert("@app/*".to_string(), "src/app/*".to_string());

        let text = serde_json::to_string_pretty(&config).unwrap();
        assert!(text.contains("\"match\""));
        assert!(text.contains("\"as\": \"array\""));

        let parsed: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(
            parsed.schema_for("ts_library").primary(Field::Srcs).as_type,
            FieldType::Array
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.manage.rules.push(" ".to_string());
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.matchers.test = vec!["src/[oops".to_string()];
        assert!(matches!(config.validate(), Err(Error::PatternError(_))));

        let mut config = Config::default();
        config.cache_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_create_subincludes_dedup() {
        let mut config = Config::default();
        config.on_create.subinclude = vec!["//build_defs:ts".to_string()];
        config.on_create.test.subinclude = vec![
            "//build_defs:ts".to_string(),
            "//build_defs:jest".to_string(),
        ];
        assert_eq!(
            config.create_subincludes(FileRole::Test),
            vec!["//build_defs:ts", "//build_defs:jest"]
        );
        assert_eq!(
            config.create_subincludes(FileRole::Module),
            vec!["//build_defs:ts"]
        );
    }
}
