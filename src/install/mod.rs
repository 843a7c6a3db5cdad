//! Gradle distribution installation
//!
//! Installs a resolved `VersionInfo` under the provisioning root, reusing a
//! matching Gradle on PATH, an earlier install, or a cached download before
//! falling back to the network.

mod archive;
mod installer;
mod layout;
mod locate;

pub use archive::{ArchiveError, ArchiveTool, HttpZipArchiveTool};
pub use installer::{CacheMode, DistributionInstaller, InstallError};
pub use layout::{launcher_name, ProvisionLayout, TOOL_NAME};
pub use locate::{find_on_path, reported_version, reports_version, PathProbe};
