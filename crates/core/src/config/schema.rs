//! Managed field schema: which keyword arguments hold a logical field, and as what type

use serde::{Deserialize, Serialize};

/// Value type a field alias is expected to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Array,
    Bool,
    Number,
    Glob,
}

/// One alias of a logical field, e.g. `{"value": "srcs", "as": "glob"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub value: String,
    #[serde(rename = "as")]
    pub as_type: FieldType,
}

impl FieldEntry {
    pub fn new(value: &str, as_type: FieldType) -> Self {
        Self {
            value: value.to_string(),
            as_type,
        }
    }
}

/// Logical fields of a managed rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Srcs,
    Deps,
    Visibility,
    TestOnly,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Srcs,
        Field::Deps,
        Field::Visibility,
        Field::TestOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Srcs => "srcs",
            Field::Deps => "deps",
            Field::Visibility => "visibility",
            Field::TestOnly => "test_only",
        }
    }

    /// Aliases used when a rule's schema does not declare the field
    pub fn default_entries(self) -> Vec<FieldEntry> {
        match self {
            Field::Name => vec![FieldEntry::new("name", FieldType::String)],
            Field::Srcs => vec![
                FieldEntry::new("srcs", FieldType::Array),
                FieldEntry::new("srcs", FieldType::Glob),
                FieldEntry::new("src", FieldType::String),
            ],
            Field::Deps => vec![FieldEntry::new("deps", FieldType::Array)],
            Field::Visibility => vec![FieldEntry::new("visibility", FieldType::Array)],
            Field::TestOnly => vec![FieldEntry::new("test_only", FieldType::Bool)],
        }
    }
}

/// Schema of one managed rule kind. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ManagedSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<FieldEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcs: Option<Vec<FieldEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps: Option<Vec<FieldEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<FieldEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_only: Option<Vec<FieldEntry>>,
}

impl ManagedSchema {
    /// Declared aliases for `field` in order, first declared wins
    pub fn entries(&self, field: Field) -> Vec<FieldEntry> {
        let declared = match field {
            Field::Name => &self.name,
            Field::Srcs => &self.srcs,
            Field::Deps => &self.deps,
            Field::Visibility => &self.visibility,
            Field::TestOnly => &self.test_only,
        };
        match declared {
            Some(entries) if !entries.is_empty() => entries.clone(),
            _ => field.default_entries(),
        }
    }

    /// Keyword argument the builder writes for `field`
    pub fn primary(&self, field: Field) -> FieldEntry {
        self.entries(field)
            .into_iter()
            .next()
            .unwrap_or_else(|| FieldEntry::new(field.as_str(), FieldType::String))
    }

    /// First alias of `field` with the given type
    pub fn entry_of_type(&self, field: Field, as_type: FieldType) -> Option<FieldEntry> {
        self.entries(field).into_iter().find(|e| e.as_type == as_type)
    }

    /// Whether `key` is any alias of `field`
    pub fn is_alias(&self, field: Field, key: &str) -> bool {
        self.entries(field).iter().any(|e| e.value == key)
    }
}
