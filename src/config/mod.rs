//! Layered configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults derived from the runner environment
//! 2. TOML config file (`--config`, else `.github/gradle-provision.toml`)
//! 3. `GRADLE_PROVISION_*` environment variables
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, ACTIONS_DIR};
pub use effective::{
    env_overrides, env_overrides_from, CacheSettings, ConfigError, ConfigOrigin, ConfigSource,
    EffectiveConfig, ProvisionSettings, DEFAULT_CONFIG_FILE, ENV_CACHE_DISABLED,
    ENV_CACHE_READ_ONLY, ENV_VERSIONS_URL,
};
pub use merge::{deep_merge, merge_layers};
