//! Gradle cache cleanup
//!
//! Bounds the growth of a persistent Gradle user home across jobs by having
//! Gradle evict everything not used since the job started.

mod cleaner;
mod fence;
mod project;
mod script;

use std::num::ParseIntError;
use std::path::PathBuf;

pub use cleaner::{CacheCleaner, DEPENDENCY_GRAPH_PROPERTY, FENCE_STATE_KEY};
pub use fence::FenceTimestamp;
pub use project::{ScratchProject, BUILD_FILE, INIT_SCRIPT_FILE, NOOP_TASK, PROJECT_NAME, SETTINGS_FILE};
pub use script::{CacheCategory, InitScript};

use crate::exec::ExecError;
use crate::provision::ProvisionError;

/// Errors from cache cleanup
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("job state error: {0}")]
    State(#[from] job_runtime::StateError),

    #[error("no cleanup timestamp recorded for this job; run `cleanup prepare` at job start")]
    MissingFenceTimestamp,

    #[error("recorded cleanup timestamp {value:?} is not a millisecond timestamp: {source}")]
    InvalidFenceTimestamp {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to create cleanup project under {dir}: {source}")]
    Project {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("cache cleanup build failed with {status}: {stderr}")]
    BuildFailed { status: String, stderr: String },
}
