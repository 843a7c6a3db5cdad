//! Gradle version resolution
//!
//! Turns a requested version (`current`, `release-candidate`, `nightly`,
//! `release-nightly`, or an exact version string) into the concrete version
//! and download URL published by the Gradle versions service.

mod resolver;
mod source;
mod spec;

pub use resolver::VersionResolver;
pub use source::{HttpVersionSource, VersionDeclaration, VersionSource, DEFAULT_VERSIONS_URL};
pub use spec::{Channel, VersionSpec};

use serde::{Deserialize, Serialize};

/// A resolved, downloadable Gradle version.
///
/// Two infos with the same `version` describe the same install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    version: String,
    download_url: String,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            download_url: download_url.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }
}

/// Errors from version resolution
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Gradle version {0} does not exist")]
    NotFound(String),

    #[error("{channel} declaration from {url} has no version or download URL")]
    IncompleteDeclaration { channel: Channel, url: String },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },
}
