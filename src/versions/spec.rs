//! Requested version specifications.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Named release channels published by the versions service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Current,
    ReleaseCandidate,
    Nightly,
    ReleaseNightly,
}

impl Channel {
    /// Endpoint name under the versions service base URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::ReleaseCandidate => "release-candidate",
            Self::Nightly => "nightly",
            Self::ReleaseNightly => "release-nightly",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested Gradle version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    Current,
    ReleaseCandidate,
    Nightly,
    ReleaseNightly,
    /// A version string looked up in the full catalog, e.g. `8.5` or `8.6-rc-1`
    Exact(String),
}

impl VersionSpec {
    /// Parse a requested version.
    ///
    /// `rc` is accepted as a deprecated alias for `release-candidate`. Any
    /// other unrecognised string is an exact version.
    pub fn parse(requested: &str) -> Self {
        match requested.trim() {
            "current" => Self::Current,
            "release-candidate" => Self::ReleaseCandidate,
            "rc" => {
                warn!("Specifying gradle-version 'rc' has been deprecated. Use 'release-candidate' instead.");
                Self::ReleaseCandidate
            }
            "nightly" => Self::Nightly,
            "release-nightly" => Self::ReleaseNightly,
            exact => Self::Exact(exact.to_string()),
        }
    }

    /// The release channel this spec follows, if it is symbolic.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Self::Current => Some(Channel::Current),
            Self::ReleaseCandidate => Some(Channel::ReleaseCandidate),
            Self::Nightly => Some(Channel::Nightly),
            Self::ReleaseNightly => Some(Channel::ReleaseNightly),
            Self::Exact(_) => None,
        }
    }
}

impl FromStr for VersionSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str(Channel::Current.as_str()),
            Self::ReleaseCandidate => f.write_str(Channel::ReleaseCandidate.as_str()),
            Self::Nightly => f.write_str(Channel::Nightly.as_str()),
            Self::ReleaseNightly => f.write_str(Channel::ReleaseNightly.as_str()),
            Self::Exact(version) => f.write_str(version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbolic() {
        assert_eq!(VersionSpec::parse("current"), VersionSpec::Current);
        assert_eq!(VersionSpec::parse("release-candidate"), VersionSpec::ReleaseCandidate);
        assert_eq!(VersionSpec::parse("nightly"), VersionSpec::Nightly);
        assert_eq!(VersionSpec::parse("release-nightly"), VersionSpec::ReleaseNightly);
    }

    #[test]
    fn test_parse_rc_alias() {
        assert_eq!(VersionSpec::parse("rc"), VersionSpec::ReleaseCandidate);
    }

    #[test]
    fn test_parse_exact() {
        assert_eq!(VersionSpec::parse("8.5"), VersionSpec::Exact("8.5".to_string()));
        assert_eq!(
            VersionSpec::parse(" 8.6-rc-1 "),
            VersionSpec::Exact("8.6-rc-1".to_string())
        );
        // Symbolic names are case sensitive
        assert_eq!(
            VersionSpec::parse("Current"),
            VersionSpec::Exact("Current".to_string())
        );
    }

    #[test]
    fn test_display_roundtrips_parse() {
        for input in ["current", "release-candidate", "nightly", "release-nightly", "7.6.4"] {
            assert_eq!(VersionSpec::parse(input).to_string(), input);
        }
    }

    #[test]
    fn test_channel_endpoint_names() {
        assert_eq!(Channel::Current.as_str(), "current");
        assert_eq!(Channel::ReleaseCandidate.as_str(), "release-candidate");
        assert_eq!(Channel::ReleaseNightly.to_string(), "release-nightly");
        assert_eq!(VersionSpec::Exact("8.5".into()).channel(), None);
    }
}
