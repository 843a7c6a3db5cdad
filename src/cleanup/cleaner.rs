//! Fence-based forced cache cleanup
//!
//! `prepare` records the fence at the start of a job. `force_cleanup` runs at
//! the end of the job: it builds a scratch project with an init script that
//! makes Gradle evict every cache entry not used since the fence. The
//! eviction itself is Gradle's own; this only arranges for it to run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use job_runtime::{JobStateStore, LogGroup};
use tracing::info;

use super::fence::FenceTimestamp;
use super::project::{ScratchProject, INIT_SCRIPT_FILE, NOOP_TASK};
use super::CleanupError;
use crate::exec::{CommandRunner, DisplayStatus};
use crate::provision::Provisioner;
use crate::versions::VersionSpec;

/// Job-state key holding the fence timestamp
pub const FENCE_STATE_KEY: &str = "clean-timestamp";

/// System property turning off dependency-graph submission in the cleanup build
pub const DEPENDENCY_GRAPH_PROPERTY: &str = "GITHUB_DEPENDENCY_GRAPH_ENABLED";

/// Runs Gradle's cache eviction against a Gradle user home.
#[derive(Clone)]
pub struct CacheCleaner {
    gradle_user_home: PathBuf,
    tmp_dir: PathBuf,
    state: Arc<dyn JobStateStore>,
    provisioner: Provisioner,
    runner: Arc<dyn CommandRunner>,
}

impl CacheCleaner {
    pub fn new(
        gradle_user_home: impl Into<PathBuf>,
        tmp_dir: impl Into<PathBuf>,
        state: Arc<dyn JobStateStore>,
        provisioner: Provisioner,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            gradle_user_home: gradle_user_home.into(),
            tmp_dir: tmp_dir.into(),
            state,
            provisioner,
            runner,
        }
    }

    /// Record the fence for this job and return it.
    ///
    /// Calling this again in the same job moves the fence forward.
    pub fn prepare(&self) -> Result<FenceTimestamp, CleanupError> {
        let fence = FenceTimestamp::now();
        self.state.put(FENCE_STATE_KEY, &fence.to_string())?;
        Ok(fence)
    }

    /// Evict cache entries unused since the fence recorded by `prepare`.
    pub fn force_cleanup(&self) -> Result<(), CleanupError> {
        let stored = self
            .state
            .get(FENCE_STATE_KEY)?
            .filter(|v| !v.trim().is_empty())
            .ok_or(CleanupError::MissingFenceTimestamp)?;
        let fence = stored
            .parse::<FenceTimestamp>()
            .map_err(|source| CleanupError::InvalidFenceTimestamp {
                value: stored.clone(),
                source,
            })?;
        self.force_cleanup_files_older_than(fence)
    }

    /// Evict cache entries unused since `fence`.
    pub fn force_cleanup_files_older_than(&self, fence: FenceTimestamp) -> Result<(), CleanupError> {
        let project = ScratchProject::create(&self.tmp_dir, fence).map_err(|source| {
            CleanupError::Project {
                dir: self.tmp_dir.clone(),
                source,
            }
        })?;

        let executable = self.provisioner.provision_spec(&VersionSpec::Current)?;

        let _group = LogGroup::start("Executing Gradle to clean up caches");
        info!("Cleaning up caches last used before {}", fence);
        self.execute_cleanup_build(&executable, project.dir())
    }

    /// Arguments for the cleanup build, run from the scratch project directory.
    pub fn cleanup_args(&self) -> Vec<String> {
        vec![
            "-g".to_string(),
            self.gradle_user_home.to_string_lossy().to_string(),
            "-I".to_string(),
            INIT_SCRIPT_FILE.to_string(),
            "--info".to_string(),
            "--no-daemon".to_string(),
            "--no-scan".to_string(),
            "--build-cache".to_string(),
            format!("-D{DEPENDENCY_GRAPH_PROPERTY}=false"),
            NOOP_TASK.to_string(),
        ]
    }

    fn execute_cleanup_build(&self, executable: &Path, project_dir: &Path) -> Result<(), CleanupError> {
        let output = self
            .runner
            .run(executable, &self.cleanup_args(), Some(project_dir))?;

        info!("{}", output.stdout);

        if !output.is_success() {
            return Err(CleanupError::BuildFailed {
                status: DisplayStatus(output.status).to_string(),
                stderr: output.stderr,
            });
        }
        Ok(())
    }
}
