//! Version resolution policy.

use std::sync::Arc;

use tracing::info;

use super::{Channel, VersionError, VersionInfo, VersionSource, VersionSpec};

/// Resolves version specs against a `VersionSource`.
#[derive(Clone)]
pub struct VersionResolver {
    source: Arc<dyn VersionSource>,
}

impl VersionResolver {
    pub fn new(source: Arc<dyn VersionSource>) -> Self {
        Self { source }
    }

    /// Resolve a spec to a concrete version.
    ///
    /// - `ReleaseCandidate` falls back to `Current` when no RC is active.
    /// - `Exact` looks the version up in the full catalog; absence is an error.
    pub fn resolve(&self, spec: &VersionSpec) -> Result<VersionInfo, VersionError> {
        match spec {
            VersionSpec::Current => self.channel(Channel::Current),
            VersionSpec::ReleaseCandidate => self.release_candidate(),
            VersionSpec::Nightly => self.channel(Channel::Nightly),
            VersionSpec::ReleaseNightly => self.channel(Channel::ReleaseNightly),
            VersionSpec::Exact(version) => self.exact(version),
        }
    }

    fn channel(&self, channel: Channel) -> Result<VersionInfo, VersionError> {
        self.source
            .declaration(channel)?
            .to_info()
            .ok_or_else(|| VersionError::IncompleteDeclaration {
                channel,
                url: self.source.describe(channel),
            })
    }

    fn release_candidate(&self) -> Result<VersionInfo, VersionError> {
        if let Some(info) = self.source.declaration(Channel::ReleaseCandidate)?.to_info() {
            return Ok(info);
        }
        info!("No current release-candidate found, will fallback to current");
        self.channel(Channel::Current)
    }

    fn exact(&self, version: &str) -> Result<VersionInfo, VersionError> {
        self.source
            .catalog()?
            .iter()
            .filter(|decl| decl.version.as_deref() == Some(version))
            .find_map(|decl| decl.to_info())
            .ok_or_else(|| VersionError::NotFound(version.to_string()))
    }
}
