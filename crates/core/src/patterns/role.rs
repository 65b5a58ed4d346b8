//! Source file roles decided by the configured matchers

use std::fmt;

use serde::{Deserialize, Serialize};

use super::glob::GlobSet;
use crate::config::MatchConfig;
use crate::error::Result;

/// What a source file is to the build: library code, a test or test fixture data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    Module,
    Test,
    Fixture,
}

impl FileRole {
    pub const ALL: [FileRole; 3] = [FileRole::Module, FileRole::Test, FileRole::Fixture];

    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::Module => "module",
            FileRole::Test => "test",
            FileRole::Fixture => "fixture",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled `match` section
#[derive(Debug, Clone, Default)]
pub struct RoleMatcher {
    module: GlobSet,
    test: GlobSet,
    fixture: GlobSet,
}

impl RoleMatcher {
    pub fn new(config: &MatchConfig) -> Result<Self> {
        Ok(Self {
            module: GlobSet::new(&config.module)?,
            test: GlobSet::new(&config.test)?,
            fixture: GlobSet::new(&config.fixture)?,
        })
    }

    /// Role of a workspace-relative path. Tests win over fixtures, fixtures over modules.
    pub fn role_of(&self, path: &str) -> Option<FileRole> {
        if self.test.is_match(path) {
            Some(FileRole::Test)
        } else if self.fixture.is_match(path) {
            Some(FileRole::Fixture)
        } else if self.module.is_match(path) {
            Some(FileRole::Module)
        } else {
            None
        }
    }
}
