//! Init script instructing Gradle to evict stale cache entries.
//!
//! Rendered from a fixed schema: one fence timestamp applied to every cache
//! category Gradle exposes through `settings.caches`.

use std::fmt;

use super::fence::FenceTimestamp;

/// Cache categories configurable through Gradle's `caches` DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCategory {
    ReleasedWrappers,
    SnapshotWrappers,
    DownloadedResources,
    CreatedResources,
    BuildCache,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 5] = [
        Self::ReleasedWrappers,
        Self::SnapshotWrappers,
        Self::DownloadedResources,
        Self::CreatedResources,
        Self::BuildCache,
    ];

    /// Property name in the `caches` DSL.
    pub fn dsl_name(&self) -> &'static str {
        match self {
            Self::ReleasedWrappers => "releasedWrappers",
            Self::SnapshotWrappers => "snapshotWrappers",
            Self::DownloadedResources => "downloadedResources",
            Self::CreatedResources => "createdResources",
            Self::BuildCache => "buildCache",
        }
    }
}

/// `init.gradle` content for a forced cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitScript {
    fence: FenceTimestamp,
}

impl InitScript {
    pub fn new(fence: FenceTimestamp) -> Self {
        Self { fence }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InitScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "beforeSettings {{ settings ->")?;
        writeln!(f, "    settings.caches {{")?;
        writeln!(f, "        cleanup = Cleanup.ALWAYS")?;
        writeln!(f)?;
        for category in CacheCategory::ALL {
            writeln!(
                f,
                "        {}.removeUnusedEntriesOlderThan.set({})",
                category.dsl_name(),
                self.fence
            )?;
        }
        writeln!(f, "    }}")?;
        writeln!(f, "}}")
    }
}
