//! Gradle provisioning for CI jobs
//!
//! Resolves a requested Gradle version against the Gradle versions service,
//! installs the distribution into a job-scoped directory (reusing a persistent
//! cache where possible), and cleans stale entries out of the Gradle user home
//! at the end of a job.

pub mod cleanup;
pub mod config;
pub mod context;
pub mod exec;
pub mod install;
pub mod mock;
pub mod provision;
pub mod versions;

pub use cleanup::{CacheCleaner, CleanupError, FenceTimestamp, InitScript};
pub use config::{ConfigError, EffectiveConfig, ProvisionSettings};
pub use context::{ContextError, Toolkit};
pub use install::{CacheMode, DistributionInstaller, InstallError, ProvisionLayout};
pub use provision::{ProvisionError, Provisioner};
pub use versions::{VersionError, VersionInfo, VersionResolver, VersionSpec};
