//! Configuration merge logic
//!
//! Layers merge with:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (second wins entirely)
/// - Scalars: override (second wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        // Both objects: deep merge
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        // Arrays: REPLACE (no concatenation)
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        // Scalars and any other case: overlay wins
        (_, overlay) => overlay,
    }
}

/// Merge multiple config layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"versions_url": "https://services.gradle.org/versions"});
        let overlay = json!({"versions_url": "http://mirror.local/versions"});
        let result = deep_merge(base, overlay);
        assert_eq!(result["versions_url"], "http://mirror.local/versions");
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "cache": {
                "disabled": false,
                "read_only": false,
                "root": "/home/runner/.cache"
            }
        });
        let overlay = json!({
            "cache": {
                "read_only": true
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["cache"]["read_only"], true);
        assert_eq!(result["cache"]["disabled"], false);
        assert_eq!(result["cache"]["root"], "/home/runner/.cache");
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"paths": ["a", "b", "c"]});
        let overlay = json!({"paths": ["x"]});
        let result = deep_merge(base, overlay);

        assert_eq!(result["paths"], json!(["x"]));
    }

    #[test]
    fn test_add_new_key() {
        let base = json!({"a": 1});
        let overlay = json!({"b": 2});
        let result = deep_merge(base, overlay);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 2);
    }

    #[test]
    fn test_null_override() {
        let base = json!({"value": 100});
        let overlay = json!({"value": null});
        let result = deep_merge(base, overlay);

        assert!(result["value"].is_null());
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({
            "gradle_user_home": "/home/runner/.gradle",
            "cache": {"disabled": false, "read_only": false}
        });
        let file = json!({"cache": {"read_only": true}});
        let env = json!({"cache": {"disabled": true}});
        let cli = json!({"gradle_user_home": "/tmp/gradle"});

        let result = merge_layers(vec![builtin, file, env, cli]);

        assert_eq!(result["gradle_user_home"], "/tmp/gradle");
        assert_eq!(result["cache"]["read_only"], true);
        assert_eq!(result["cache"]["disabled"], true);
    }
}
