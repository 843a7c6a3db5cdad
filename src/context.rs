//! Production wiring
//!
//! Builds the provisioner and cache cleaner from typed settings, choosing
//! GitHub Actions backed collaborators when the runner provides them.

use std::sync::Arc;

use job_runtime::{
    CacheGateway, DirectoryCacheGateway, FileStateStore, GithubCommandFiles, GithubStateStore,
    JobStateStore, ProcessOutputs, StepOutputs,
};
use tracing::debug;

use crate::cleanup::CacheCleaner;
use crate::config::ProvisionSettings;
use crate::exec::{CommandRunner, SystemCommandRunner};
use crate::install::{ArchiveError, DistributionInstaller, HttpZipArchiveTool, PathProbe, ProvisionLayout};
use crate::provision::Provisioner;
use crate::versions::{HttpVersionSource, VersionError, VersionResolver};

/// Errors constructing the production collaborators
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// The collaborators a command needs, shared between provisioning and cleanup.
#[derive(Clone)]
pub struct Toolkit {
    settings: ProvisionSettings,
    provisioner: Provisioner,
    state: Arc<dyn JobStateStore>,
    runner: Arc<dyn CommandRunner>,
}

impl Toolkit {
    pub fn from_settings(settings: ProvisionSettings) -> Result<Self, ContextError> {
        let state: Arc<dyn JobStateStore> = match GithubStateStore::from_env(&settings.state_file) {
            Some(store) => {
                debug!(path = %store.mirror_path().display(), "using GitHub job state");
                Arc::new(store)
            }
            None => {
                debug!(path = %settings.state_file.display(), "using file job state");
                Arc::new(FileStateStore::new(&settings.state_file))
            }
        };
        let outputs: Arc<dyn StepOutputs> = match GithubCommandFiles::from_env() {
            Some(files) => Arc::new(files),
            None => Arc::new(ProcessOutputs),
        };
        let cache: Arc<dyn CacheGateway> = Arc::new(DirectoryCacheGateway::new(&settings.cache.root));
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);

        let source = HttpVersionSource::new(settings.versions_url.clone())?;
        let installer = DistributionInstaller::new(
            ProvisionLayout::under_temp(&settings.runner_temp),
            settings.cache_mode(),
            cache,
            Arc::new(HttpZipArchiveTool::new()?),
            PathProbe::new(runner.clone()),
        );
        let provisioner = Provisioner::new(VersionResolver::new(Arc::new(source)), installer, outputs);

        Ok(Self::new(settings, provisioner, state, runner))
    }

    pub fn new(
        settings: ProvisionSettings,
        provisioner: Provisioner,
        state: Arc<dyn JobStateStore>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            settings,
            provisioner,
            state,
            runner,
        }
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }

    pub fn cleaner(&self) -> CacheCleaner {
        CacheCleaner::new(
            &self.settings.gradle_user_home,
            &self.settings.runner_temp,
            self.state.clone(),
            self.provisioner.clone(),
            self.runner.clone(),
        )
    }
}
