//! Layered configuration merging
//!
//! Config files are merged as JSON values from the workspace root down to the
//! directory of the file being processed: objects merge key by key, every
//! other value (arrays included) is replaced by the more specific layer.

use serde_json::Value;
use tracing::debug;

use super::Config;
use crate::error::{Error, Result};

/// Merge `overlay` into `base` in place
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

impl Config {
    /// Build a config from layers ordered least to most specific, on top of the defaults
    pub fn from_layers(layers: Vec<Value>) -> Result<Self> {
        let mut merged = serde_json::to_value(Config::default())?;
        for (idx, layer) in layers.into_iter().enumerate() {
            if !layer.is_object() {
                return Err(Error::ConfigError(format!(
                    "config layer {idx} must be a JSON object"
                )));
            }
            merge_values(&mut merged, layer);
        }
        debug!("Merged config: {}", merged);
        let config: Config = serde_json::from_value(merged)
            .map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_objects_recursively_and_replace_arrays() {
        let mut base = json!({
            "match": {"module": ["**/*.ts"], "test": ["**/*.test.ts"]},
            "canonical_labels": false
        });
        merge_values(
            &mut base,
            json!({"match": {"module": ["src/**/*.ts"]}, "canonical_labels": true}),
        );
        assert_eq!(
            base,
            json!({
                "match": {"module": ["src/**/*.ts"], "test": ["**/*.test.ts"]},
                "canonical_labels": true
            })
        );
    }

    #[test]
    fn test_from_layers_keeps_role_defaults() {
        let config = Config::from_layers(vec![
            json!({"on_create": {"test": {"name": "jest_test"}}}),
            json!({"on_create": {"omit_empty_fields": false}}),
        ])
        .unwrap();
        assert_eq!(config.on_create.test.name, "jest_test");
        assert_eq!(config.on_create.test.target_format, "<firstname>_test");
        assert!(!config.on_create.omit_empty_fields);
        assert_eq!(config.on_create.fixture.test_only, Some(true));
    }

    #[test]
    fn test_from_layers_rejects_invalid() {
        assert!(Config::from_layers(vec![json!([1, 2])]).is_err());
        assert!(Config::from_layers(vec![json!({"cache_size": "big"})]).is_err());
        assert!(Config::from_layers(vec![json!({"match": {"test": ["{a"]}})]).is_err());
    }
}
