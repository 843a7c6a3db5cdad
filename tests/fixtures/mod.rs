//! Shared fixtures for integration tests
//!
//! Builds provisioners and cleaners wired to in-memory collaborators, plus
//! paths to golden files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gradle_provision::cleanup::CacheCleaner;
use gradle_provision::install::PathProbe;
use gradle_provision::mock::{MockArchiveTool, MockCommandRunner, MockVersionSource};
use gradle_provision::versions::{Channel, VersionDeclaration};
use gradle_provision::{CacheMode, DistributionInstaller, ProvisionLayout, Provisioner, VersionResolver};
use job_runtime::{JobStateStore, MemoryCacheGateway, MemoryOutputs, MemoryStateStore};
use tempfile::TempDir;

/// Path to the init script golden file, rendered for fence 1700000000000
pub fn init_script_golden_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cleanup/init.gradle.golden")
}

pub fn download_url(version: &str) -> String {
    format!("https://services.gradle.org/distributions/gradle-{version}-bin.zip")
}

/// A versions service with every channel populated.
///
/// `release-candidate` is an empty declaration, as the service returns when
/// no release candidate is active.
pub fn versions_service() -> MockVersionSource {
    MockVersionSource::new()
        .with_channel(Channel::Current, VersionDeclaration::new("8.5", download_url("8.5")))
        .with_channel(Channel::ReleaseCandidate, VersionDeclaration::default())
        .with_channel(
            Channel::Nightly,
            VersionDeclaration::new("8.7-20240101000000+0000", download_url("8.7-20240101000000+0000")),
        )
        .with_channel(
            Channel::ReleaseNightly,
            VersionDeclaration::new("8.6-20240101000000+0000", download_url("8.6-20240101000000+0000")),
        )
        .with_catalog(vec![
            VersionDeclaration::new("8.5", download_url("8.5")),
            VersionDeclaration::new("8.4", download_url("8.4")),
            VersionDeclaration::new("7.6.4", download_url("7.6.4")),
        ])
}

/// Everything a test needs to drive provisioning and cleanup.
pub struct Harness {
    pub temp_dir: TempDir,
    pub source: Arc<MockVersionSource>,
    pub cache: Arc<MemoryCacheGateway>,
    pub archives: Arc<MockArchiveTool>,
    pub outputs: Arc<MemoryOutputs>,
    pub state: Arc<MemoryStateStore>,
    pub runner: Arc<MockCommandRunner>,
    pub provisioner: Provisioner,
}

impl Harness {
    pub fn new(cache_mode: CacheMode) -> Self {
        Self::with_parts(cache_mode, MemoryCacheGateway::new(), MockCommandRunner::new())
    }

    pub fn with_parts(cache_mode: CacheMode, cache: MemoryCacheGateway, runner: MockCommandRunner) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = Arc::new(versions_service());
        let cache = Arc::new(cache);
        let archives = Arc::new(MockArchiveTool::new());
        let outputs = Arc::new(MemoryOutputs::new());
        let runner = Arc::new(runner);

        // An empty search path keeps the host's own Gradle out of the picture
        let path_lookup = PathProbe::new(runner.clone()).with_search_path("");
        let installer = DistributionInstaller::new(
            ProvisionLayout::under_temp(temp_dir.path()),
            cache_mode,
            cache.clone(),
            archives.clone(),
            path_lookup,
        );
        let provisioner = Provisioner::new(VersionResolver::new(source.clone()), installer, outputs.clone());

        Self {
            temp_dir,
            source,
            cache,
            archives,
            outputs,
            state: Arc::new(MemoryStateStore::new()),
            runner,
            provisioner,
        }
    }

    pub fn layout(&self) -> ProvisionLayout {
        ProvisionLayout::under_temp(self.temp_dir.path())
    }

    pub fn gradle_user_home(&self) -> PathBuf {
        self.temp_dir.path().join("gradle-user-home")
    }

    pub fn cleaner(&self) -> CacheCleaner {
        self.cleaner_with_state(self.state.clone())
    }

    /// A cleaner over a caller-provided job state store.
    pub fn cleaner_with_state(&self, state: Arc<dyn JobStateStore>) -> CacheCleaner {
        CacheCleaner::new(
            self.gradle_user_home(),
            self.temp_dir.path(),
            state,
            self.provisioner.clone(),
            self.runner.clone(),
        )
    }
}
