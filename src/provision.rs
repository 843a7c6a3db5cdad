//! Provisioning entry point
//!
//! Resolve the requested version, publish it as a step output, install it,
//! and put its launcher on PATH.

use std::path::PathBuf;
use std::sync::Arc;

use job_runtime::{OutputError, StepOutputs};

use crate::install::{DistributionInstaller, InstallError};
use crate::versions::{VersionError, VersionResolver, VersionSpec};

/// Step output carrying the resolved Gradle version
pub const GRADLE_VERSION_OUTPUT: &str = "gradle-version";

/// Request value meaning "use the project's Gradle wrapper"
pub const WRAPPER_REQUEST: &str = "wrapper";

/// Errors from provisioning
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Resolves and installs Gradle versions for a job.
#[derive(Clone)]
pub struct Provisioner {
    resolver: VersionResolver,
    installer: DistributionInstaller,
    outputs: Arc<dyn StepOutputs>,
}

impl Provisioner {
    pub fn new(
        resolver: VersionResolver,
        installer: DistributionInstaller,
        outputs: Arc<dyn StepOutputs>,
    ) -> Self {
        Self {
            resolver,
            installer,
            outputs,
        }
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    /// Provision the requested version.
    ///
    /// An empty request or `wrapper` provisions nothing and returns `None`.
    pub fn provision(&self, requested: &str) -> Result<Option<PathBuf>, ProvisionError> {
        let requested = requested.trim();
        if requested.is_empty() || requested == WRAPPER_REQUEST {
            return Ok(None);
        }
        self.provision_spec(&VersionSpec::parse(requested)).map(Some)
    }

    /// Resolve and install `spec`, returning the launcher path.
    pub fn provision_spec(&self, spec: &VersionSpec) -> Result<PathBuf, ProvisionError> {
        let info = self.resolver.resolve(spec)?;
        self.outputs.set_output(GRADLE_VERSION_OUTPUT, info.version())?;

        let executable = self.installer.install(&info)?;
        if let Some(bin_dir) = executable.parent() {
            self.outputs.add_path(bin_dir)?;
        }
        Ok(executable)
    }
}
