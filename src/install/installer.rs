//! Distribution installer
//!
//! Resolution order, first match wins:
//! 1. a Gradle on PATH reporting the requested version
//! 2. an existing installation directory for the version
//! 3. the distribution archive, restored from cache or downloaded, then extracted

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use job_runtime::{CacheGateway, LogGroup};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::archive::{ArchiveError, ArchiveTool};
use super::layout::ProvisionLayout;
use super::locate::PathProbe;
use crate::versions::VersionInfo;

/// How the installer uses the distribution cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Restore, and save after a download
    #[default]
    Enabled,
    /// Restore only
    ReadOnly,
    /// Never touch the cache
    Disabled,
}

impl CacheMode {
    /// Derive the mode from the `disabled` / `read_only` switches.
    pub fn from_flags(disabled: bool, read_only: bool) -> Self {
        match (disabled, read_only) {
            (true, _) => Self::Disabled,
            (false, true) => Self::ReadOnly,
            (false, false) => Self::Enabled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::ReadOnly => "read-only",
            Self::Disabled => "disabled",
        }
    }
}

/// Errors from installing a distribution
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Installs Gradle distributions into a `ProvisionLayout`.
#[derive(Clone)]
pub struct DistributionInstaller {
    layout: ProvisionLayout,
    cache_mode: CacheMode,
    cache: Arc<dyn CacheGateway>,
    archives: Arc<dyn ArchiveTool>,
    probe: PathProbe,
}

impl DistributionInstaller {
    pub fn new(
        layout: ProvisionLayout,
        cache_mode: CacheMode,
        cache: Arc<dyn CacheGateway>,
        archives: Arc<dyn ArchiveTool>,
        probe: PathProbe,
    ) -> Self {
        Self {
            layout,
            cache_mode,
            cache,
            archives,
            probe,
        }
    }

    pub fn layout(&self) -> &ProvisionLayout {
        &self.layout
    }

    /// Ensure `info` is installed and return the path of its launcher.
    pub fn install(&self, info: &VersionInfo) -> Result<PathBuf, InstallError> {
        let _group = LogGroup::start(format!("Provision Gradle {}", info.version()));

        if let Some(on_path) = self.probe.find_matching(info) {
            info!(
                "Gradle version {} is already available on PATH. Not installing.",
                info.version()
            );
            return Ok(on_path);
        }

        self.locate_or_download(info)
    }

    fn locate_or_download(&self, info: &VersionInfo) -> Result<PathBuf, InstallError> {
        let install_dir = self.layout.install_dir(info.version());
        if install_dir.exists() {
            info!("Gradle installation already exists at {}", install_dir.display());
            return Ok(ProvisionLayout::executable_in(&install_dir));
        }

        let archive = self.download_and_cache(info)?;
        self.archives
            .extract_zip(&archive, &self.layout.installs_dir())?;
        info!("Extracted Gradle {} to {}", info.version(), install_dir.display());

        let executable = ProvisionLayout::executable_in(&install_dir);
        make_executable(&executable)?;
        info!("Provisioned Gradle executable {}", executable.display());

        Ok(executable)
    }

    /// Obtain the distribution archive, returning its local path.
    fn download_and_cache(&self, info: &VersionInfo) -> Result<PathBuf, InstallError> {
        let download_path = self.layout.download_path(info.version());

        if self.cache_mode == CacheMode::Disabled {
            self.download(info, &download_path)?;
            return Ok(download_path);
        }

        let cache_key = ProvisionLayout::cache_key(info.version());
        let paths = vec![download_path.clone()];

        match self.cache.restore(&paths, &cache_key) {
            Ok(Some(_)) => {
                info!(
                    "Restored Gradle distribution {} from cache to {}",
                    cache_key,
                    download_path.display()
                );
                return Ok(download_path);
            }
            Ok(None) => {}
            Err(e) => warn!("Restore Gradle distribution {} failed: {}", info.version(), e),
        }

        info!("Gradle distribution {} not found in cache. Will download.", info.version());
        self.download(info, &download_path)?;

        if self.cache_mode != CacheMode::ReadOnly {
            if let Err(e) = self.cache.save(&paths, &cache_key) {
                warn!("Save Gradle distribution {} failed: {}", info.version(), e);
            }
        }

        Ok(download_path)
    }

    fn download(&self, info: &VersionInfo, dest: &Path) -> Result<(), InstallError> {
        let size = self.archives.download(info.download_url(), dest)?;
        info!(
            "Downloaded {} to {} (size {})",
            info.download_url(),
            dest.display(),
            size
        );
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| InstallError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<(), InstallError> {
    fs::metadata(path).map(|_| ()).map_err(|source| InstallError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecOutput;
    use crate::install::launcher_name;
    use crate::mock::{MockArchiveTool, MockCommandRunner};
    use job_runtime::MemoryCacheGateway;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        layout: ProvisionLayout,
        cache: Arc<MemoryCacheGateway>,
        archives: Arc<MockArchiveTool>,
    }

    impl Fixture {
        fn new(cache: MemoryCacheGateway) -> Self {
            let temp_dir = TempDir::new().unwrap();
            let layout = ProvisionLayout::under_temp(temp_dir.path());
            Self {
                _temp_dir: temp_dir,
                layout,
                cache: Arc::new(cache),
                archives: Arc::new(MockArchiveTool::new()),
            }
        }

        fn installer(&self, mode: CacheMode) -> DistributionInstaller {
            let path_lookup = PathProbe::new(Arc::new(MockCommandRunner::new())).with_search_path("");
            self.installer_with_lookup(mode, path_lookup)
        }

        fn installer_with_lookup(&self, mode: CacheMode, path_lookup: PathProbe) -> DistributionInstaller {
            DistributionInstaller::new(
                self.layout.clone(),
                mode,
                self.cache.clone(),
                self.archives.clone(),
                path_lookup,
            )
        }
    }

    fn info() -> VersionInfo {
        VersionInfo::new("8.5", "https://services.gradle.org/distributions/gradle-8.5-bin.zip")
    }

    #[test]
    fn test_cache_mode_from_flags() {
        assert_eq!(CacheMode::from_flags(false, false), CacheMode::Enabled);
        assert_eq!(CacheMode::from_flags(false, true), CacheMode::ReadOnly);
        assert_eq!(CacheMode::from_flags(true, true), CacheMode::Disabled);
        assert_eq!(CacheMode::from_flags(true, false), CacheMode::Disabled);
    }

    #[test]
    fn test_fresh_install_downloads_extracts_and_saves() {
        let fx = Fixture::new(MemoryCacheGateway::new());
        let exe = fx.installer(CacheMode::Enabled).install(&info()).unwrap();

        assert_eq!(exe, ProvisionLayout::executable_in(&fx.layout.install_dir("8.5")));
        assert!(exe.is_file());
        assert_eq!(fx.archives.download_count(), 1);
        assert_eq!(fx.archives.extract_count(), 1);
        assert_eq!(fx.cache.restore_count(), 1);
        assert_eq!(fx.cache.save_count(), 1);
        assert!(fx.cache.contains("gradle-8.5"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&exe).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_download_goes_to_cache_key_path() {
        let fx = Fixture::new(MemoryCacheGateway::new());
        fx.installer(CacheMode::Enabled).install(&info()).unwrap();

        let downloads = fx.archives.downloads();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].0, info().download_url());
        assert_eq!(downloads[0].1, fx.layout.download_path("8.5"));
    }

    #[test]
    fn test_cache_hit_skips_download() {
        let fx = Fixture::new(
            MemoryCacheGateway::new().with_entry("gradle-8.5", vec![b"cached zip".to_vec()]),
        );
        let exe = fx.installer(CacheMode::Enabled).install(&info()).unwrap();

        assert!(exe.is_file());
        assert_eq!(fx.archives.download_count(), 0);
        assert_eq!(fx.archives.extract_count(), 1);
        assert_eq!(fx.cache.save_count(), 0);
        assert_eq!(fs::read(fx.layout.download_path("8.5")).unwrap(), b"cached zip");
    }

    #[test]
    fn test_restore_failure_is_not_fatal() {
        let fx = Fixture::new(MemoryCacheGateway::new().failing_restore());
        let exe = fx.installer(CacheMode::Enabled).install(&info()).unwrap();

        assert!(exe.is_file());
        assert_eq!(fx.archives.download_count(), 1);
        assert_eq!(fx.cache.save_count(), 1);
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let fx = Fixture::new(MemoryCacheGateway::new().failing_save());
        let exe = fx.installer(CacheMode::Enabled).install(&info()).unwrap();

        assert!(exe.is_file());
        assert_eq!(fx.cache.save_count(), 1);
    }

    #[test]
    fn test_read_only_never_saves() {
        let fx = Fixture::new(MemoryCacheGateway::new());
        fx.installer(CacheMode::ReadOnly).install(&info()).unwrap();

        assert_eq!(fx.cache.restore_count(), 1);
        assert_eq!(fx.cache.save_count(), 0);
        assert_eq!(fx.archives.download_count(), 1);
    }

    #[test]
    fn test_disabled_never_touches_cache() {
        let fx = Fixture::new(
            MemoryCacheGateway::new().with_entry("gradle-8.5", vec![b"cached zip".to_vec()]),
        );
        fx.installer(CacheMode::Disabled).install(&info()).unwrap();

        assert_eq!(fx.cache.restore_count(), 0);
        assert_eq!(fx.cache.save_count(), 0);
        assert_eq!(fx.archives.download_count(), 1);
    }

    #[test]
    fn test_existing_install_dir_short_circuits() {
        let fx = Fixture::new(MemoryCacheGateway::new());
        let install_dir = fx.layout.install_dir("8.5");
        fs::create_dir_all(&install_dir).unwrap();

        let exe = fx.installer(CacheMode::Enabled).install(&info()).unwrap();

        assert_eq!(exe, ProvisionLayout::executable_in(&install_dir));
        assert_eq!(fx.archives.download_count(), 0);
        assert_eq!(fx.archives.extract_count(), 0);
        assert_eq!(fx.cache.restore_count(), 0);
        assert_eq!(fx.cache.save_count(), 0);
    }

    #[test]
    fn test_download_failure_is_fatal() {
        let mut fx = Fixture::new(MemoryCacheGateway::new());
        fx.archives = Arc::new(MockArchiveTool::new().failing_download());

        let err = fx.installer(CacheMode::Enabled).install(&info()).unwrap_err();
        assert!(matches!(err, InstallError::Archive(ArchiveError::Download { .. })));
        assert_eq!(fx.cache.save_count(), 0);
        assert!(!fx.layout.install_dir("8.5").exists());
    }

    #[test]
    fn test_extract_failure_is_fatal() {
        let mut fx = Fixture::new(MemoryCacheGateway::new());
        fx.archives = Arc::new(MockArchiveTool::new().failing_extract());

        let err = fx.installer(CacheMode::Enabled).install(&info()).unwrap_err();
        assert!(matches!(err, InstallError::Archive(ArchiveError::Extract { .. })));
    }

    fn launcher_on_path(dir: &Path) -> PathBuf {
        let bin = dir.join("bin");
        fs::create_dir_all(&bin).unwrap();
        let launcher = bin.join(launcher_name());
        fs::write(&launcher, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755)).unwrap();
        }
        launcher
    }

    #[test]
    fn test_matching_launcher_on_path_is_used() {
        let fx = Fixture::new(MemoryCacheGateway::new());
        let path_dir = TempDir::new().unwrap();
        let launcher = launcher_on_path(path_dir.path());

        let runner = Arc::new(MockCommandRunner::new().with_response(ExecOutput::success(
            "\n------------------------------------------------------------\nGradle 8.5\n------------------------------------------------------------\n",
        )));
        let path_lookup = PathProbe::new(runner.clone()).with_search_path(path_dir.path().join("bin"));

        let exe = fx
            .installer_with_lookup(CacheMode::Enabled, path_lookup)
            .install(&info())
            .unwrap();

        assert_eq!(exe, launcher);
        assert_eq!(runner.invocations()[0].args, vec!["-v".to_string()]);
        assert_eq!(fx.cache.restore_count(), 0);
        assert_eq!(fx.cache.save_count(), 0);
        assert_eq!(fx.archives.download_count(), 0);
        assert_eq!(fx.archives.extract_count(), 0);
        assert!(!fx.layout.install_dir("8.5").exists());
    }

    #[test]
    fn test_other_version_on_path_still_installs() {
        let fx = Fixture::new(MemoryCacheGateway::new());
        let path_dir = TempDir::new().unwrap();
        launcher_on_path(path_dir.path());

        let runner = Arc::new(MockCommandRunner::new().with_response(ExecOutput::success("\nGradle 8.5.1\n")));
        let path_lookup = PathProbe::new(runner).with_search_path(path_dir.path().join("bin"));

        let exe = fx
            .installer_with_lookup(CacheMode::Enabled, path_lookup)
            .install(&info())
            .unwrap();

        assert_eq!(exe, ProvisionLayout::executable_in(&fx.layout.install_dir("8.5")));
        assert_eq!(fx.archives.download_count(), 1);
    }
}
