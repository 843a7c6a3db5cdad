//! Built-in defaults (layer 1)
//!
//! Derived from the runner environment rather than hardcoded, since every
//! path the tool touches lives under a runner-provided directory.

use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::versions::DEFAULT_VERSIONS_URL;

/// Directory under the runner temp dir holding all job-scoped tool state
pub const ACTIONS_DIR: &str = ".gradle-actions";

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Per-job scratch directory (`RUNNER_TEMP`, else the OS temp dir)
    pub runner_temp: PathBuf,

    /// Gradle user home whose caches get cleaned (`GRADLE_USER_HOME`, else `~/.gradle`)
    pub gradle_user_home: PathBuf,

    /// Base URL of the Gradle versions service
    pub versions_url: String,

    /// Job-scoped state file; under GitHub Actions it mirrors `$GITHUB_STATE`
    pub state_file: PathBuf,

    /// Where the directory cache gateway keeps its entries
    pub cache_root: PathBuf,
}

impl BuiltinDefaults {
    /// Defaults for the current process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Defaults computed from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        let runner_temp = non_empty("RUNNER_TEMP").unwrap_or_else(std::env::temp_dir);
        let home = non_empty("HOME").or_else(|| non_empty("USERPROFILE"));

        let gradle_user_home = non_empty("GRADLE_USER_HOME").unwrap_or_else(|| match &home {
            Some(home) => home.join(".gradle"),
            None => runner_temp.join(".gradle"),
        });
        let cache_root = match &home {
            Some(home) => home.join(".cache").join("gradle-provision"),
            None => runner_temp.join(ACTIONS_DIR).join("cache"),
        };
        let state_file = runner_temp.join(ACTIONS_DIR).join("job-state.json");

        Self {
            runner_temp,
            gradle_user_home,
            versions_url: DEFAULT_VERSIONS_URL.to_string(),
            state_file,
            cache_root,
        }
    }

    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "runner_temp": self.runner_temp.to_string_lossy(),
            "gradle_user_home": self.gradle_user_home.to_string_lossy(),
            "versions_url": self.versions_url,
            "state_file": self.state_file.to_string_lossy(),
            "cache": {
                "disabled": false,
                "read_only": false,
                "root": self.cache_root.to_string_lossy()
            }
        })
    }
}
