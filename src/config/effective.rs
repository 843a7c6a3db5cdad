//! Effective configuration with full provenance
//!
//! The effective config captures the merged configuration plus information
//! about where each value came from. Typed settings are read out of it with
//! [`EffectiveConfig::settings`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::install::CacheMode;

/// Schema identifier
pub const SCHEMA_ID: &str = "gradle-provision/effective_config@1";

/// Repository-relative config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = ".github/gradle-provision.toml";

pub const ENV_CACHE_DISABLED: &str = "GRADLE_PROVISION_CACHE_DISABLED";
pub const ENV_CACHE_READ_ONLY: &str = "GRADLE_PROVISION_CACHE_READ_ONLY";
pub const ENV_VERSIONS_URL: &str = "GRADLE_PROVISION_VERSIONS_URL";

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None unless the origin is a file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub disabled: bool,
    pub read_only: bool,
    pub root: PathBuf,
}

/// Typed view of the merged configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionSettings {
    pub runner_temp: PathBuf,
    pub gradle_user_home: PathBuf,
    pub versions_url: String,
    pub state_file: PathBuf,
    pub cache: CacheSettings,
}

impl ProvisionSettings {
    pub fn cache_mode(&self) -> CacheMode {
        CacheMode::from_flags(self.cache.disabled, self.cache.read_only)
    }
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers
    pub fn build(
        defaults: &BuiltinDefaults,
        config_path: Option<&Path>,
        env_overrides: Option<Value>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(defaults.to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Config file
        if let Some(path) = config_path {
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        // Layer 3: Environment
        if let Some(env) = env_overrides.filter(|v| !is_empty_object(v)) {
            layers.push(env);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Env,
                path: None,
                digest: None,
            });
        }

        // Layer 4: CLI overrides
        if let Some(cli) = cli_overrides.filter(|v| !is_empty_object(v)) {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let config = Self {
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
        };
        config.settings()?;
        Ok(config)
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((toml_to_json(toml_value), digest))
    }

    /// Typed settings, validated.
    pub fn settings(&self) -> Result<ProvisionSettings, ConfigError> {
        let settings: ProvisionSettings = serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let url = settings.versions_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "versions_url must be an http(s) URL, got {:?}",
                settings.versions_url
            )));
        }
        if settings.runner_temp.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "runner_temp must not be empty".to_string(),
            ));
        }
        if settings.gradle_user_home.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "gradle_user_home must not be empty".to_string(),
            ));
        }

        Ok(settings)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Environment layer for the current process.
pub fn env_overrides() -> Result<Value, ConfigError> {
    env_overrides_from(|key| std::env::var_os(key))
}

/// Environment layer from an arbitrary variable lookup.
///
/// Only variables that are set contribute keys, so unset ones leave lower
/// layers untouched.
pub fn env_overrides_from(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Value, ConfigError> {
    let mut cache = serde_json::Map::new();
    let mut root = serde_json::Map::new();

    if let Some(raw) = lookup(ENV_CACHE_DISABLED) {
        cache.insert("disabled".to_string(), Value::Bool(parse_flag(ENV_CACHE_DISABLED, &raw)?));
    }
    if let Some(raw) = lookup(ENV_CACHE_READ_ONLY) {
        cache.insert("read_only".to_string(), Value::Bool(parse_flag(ENV_CACHE_READ_ONLY, &raw)?));
    }
    if let Some(url) = lookup(ENV_VERSIONS_URL).filter(|v| !v.is_empty()) {
        root.insert(
            "versions_url".to_string(),
            Value::String(url.to_string_lossy().to_string()),
        );
    }
    if !cache.is_empty() {
        root.insert("cache".to_string(), Value::Object(cache));
    }
    Ok(Value::Object(root))
}

fn parse_flag(name: &str, raw: &OsString) -> Result<bool, ConfigError> {
    match raw.to_string_lossy().trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(ConfigError::ValidationError(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(|m| m.is_empty())
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn defaults() -> BuiltinDefaults {
        BuiltinDefaults::from_lookup(|key| match key {
            "RUNNER_TEMP" => Some(OsString::from("/runner/_temp")),
            "HOME" => Some(OsString::from("/home/runner")),
            _ => None,
        })
    }

    fn env(vars: &[(&str, &str)]) -> Result<Value, ConfigError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        env_overrides_from(|key| vars.get(key).map(OsString::from))
    }

    #[test]
    fn test_build_with_defaults_only() {
        let config = EffectiveConfig::build(&defaults(), None, None, None).unwrap();
        let settings = config.settings().unwrap();

        assert_eq!(settings.runner_temp, PathBuf::from("/runner/_temp"));
        assert_eq!(settings.versions_url, "https://services.gradle.org/versions");
        assert_eq!(settings.cache_mode(), CacheMode::Enabled);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].origin, ConfigOrigin::Builtin);
    }

    #[test]
    fn test_file_layer_with_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "gradle_user_home = \"/opt/gradle-home\"").unwrap();
        writeln!(temp, "[cache]").unwrap();
        writeln!(temp, "read_only = true").unwrap();

        let config = EffectiveConfig::build(&defaults(), Some(temp.path()), None, None).unwrap();
        let settings = config.settings().unwrap();

        assert_eq!(settings.gradle_user_home, PathBuf::from("/opt/gradle-home"));
        assert_eq!(settings.cache_mode(), CacheMode::ReadOnly);
        // untouched keys in the same table survive the merge
        assert_eq!(
            settings.cache.root,
            PathBuf::from("/home/runner/.cache/gradle-provision")
        );

        let source = &config.sources[1];
        assert_eq!(source.origin, ConfigOrigin::File);
        assert_eq!(source.digest.as_ref().map(|d| d.len()), Some(64));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = EffectiveConfig::build(&defaults(), Some(Path::new("/nonexistent/x.toml")), None, None);
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "cache = [").unwrap();

        let result = EffectiveConfig::build(&defaults(), Some(temp.path()), None, None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_layer() {
        let overrides = env(&[
            (ENV_CACHE_DISABLED, "true"),
            (ENV_VERSIONS_URL, "http://mirror.local/versions"),
        ])
        .unwrap();
        let config = EffectiveConfig::build(&defaults(), None, Some(overrides), None).unwrap();
        let settings = config.settings().unwrap();

        assert_eq!(settings.cache_mode(), CacheMode::Disabled);
        assert_eq!(settings.versions_url, "http://mirror.local/versions");
        assert_eq!(config.sources[1].origin, ConfigOrigin::Env);
    }

    #[test]
    fn test_empty_env_layer_not_recorded() {
        let config = EffectiveConfig::build(&defaults(), None, Some(env(&[]).unwrap()), None).unwrap();
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_env_flag_must_be_boolean() {
        let err = env(&[(ENV_CACHE_READ_ONLY, "sometimes")]).unwrap_err();
        assert!(err.to_string().contains(ENV_CACHE_READ_ONLY));
    }

    #[test]
    fn test_cli_wins_over_env() {
        let overrides = env(&[(ENV_CACHE_DISABLED, "1")]).unwrap();
        let cli = serde_json::json!({"cache": {"disabled": false}});

        let config = EffectiveConfig::build(&defaults(), None, Some(overrides), Some(cli)).unwrap();

        assert_eq!(config.config["cache"]["disabled"], false);
        assert_eq!(config.sources.last().map(|s| &s.origin), Some(&ConfigOrigin::Cli));
    }

    #[test]
    fn test_versions_url_validated() {
        let cli = serde_json::json!({"versions_url": "ftp://example.com"});

        let err = EffectiveConfig::build(&defaults(), None, None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("versions_url"));
    }

    #[test]
    fn test_to_json_has_provenance() {
        let config = EffectiveConfig::build(&defaults(), None, None, None).unwrap();
        let json: Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

        assert_eq!(json["schema_id"], SCHEMA_ID);
        assert_eq!(json["sources"][0]["origin"], "builtin");
        assert_eq!(json["config"]["state_file"], "/runner/_temp/.gradle-actions/job-state.json");
    }
}
