//! Versions metadata service client.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Channel, VersionError, VersionInfo};

/// Base URL of the public Gradle versions service
pub const DEFAULT_VERSIONS_URL: &str = "https://services.gradle.org/versions";

const USER_AGENT: &str = concat!("gradle-provision/", env!("CARGO_PKG_VERSION"));

/// A version declaration as published by the service.
///
/// The service answers `{}` for a channel with no active release, so both
/// fields are optional on the wire. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDeclaration {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl VersionDeclaration {
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            download_url: Some(download_url.into()),
        }
    }

    /// Convert to a `VersionInfo` if both fields are present and non-empty.
    pub fn to_info(&self) -> Option<VersionInfo> {
        let version = self.version.as_deref().filter(|v| !v.is_empty())?;
        let url = self.download_url.as_deref().filter(|u| !u.is_empty())?;
        Some(VersionInfo::new(version, url))
    }
}

/// Source of version declarations.
pub trait VersionSource: Send + Sync {
    /// Fetch the single declaration for a named channel.
    fn declaration(&self, channel: Channel) -> Result<VersionDeclaration, VersionError>;

    /// Fetch the full catalog of published versions.
    fn catalog(&self) -> Result<Vec<VersionDeclaration>, VersionError>;

    /// Human-readable location of a channel, for error messages.
    fn describe(&self, channel: Channel) -> String;
}

/// Version source backed by the HTTP versions service.
pub struct HttpVersionSource {
    base_url: String,
    client: Client,
}

impl HttpVersionSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, VersionError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VersionError::Http {
                url: base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { base_url, client })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, VersionError> {
        debug!(url, "fetching version metadata");
        let http_err = |e: reqwest::Error| VersionError::Http {
            url: url.to_string(),
            message: e.to_string(),
        };

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?
            .text()
            .map_err(http_err)?;

        serde_json::from_str(&body).map_err(|e| VersionError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl VersionSource for HttpVersionSource {
    fn declaration(&self, channel: Channel) -> Result<VersionDeclaration, VersionError> {
        self.get_json(&self.url(channel.as_str()))
    }

    fn catalog(&self) -> Result<Vec<VersionDeclaration>, VersionError> {
        self.get_json(&self.url("all"))
    }

    fn describe(&self, channel: Channel) -> String {
        self.url(channel.as_str())
    }
}
