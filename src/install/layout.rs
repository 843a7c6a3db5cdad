//! On-disk layout of provisioned distributions.
//!
//! ```text
//! <tmp>/.gradle-actions/gradle-installations/
//!     downloads/gradle-<version>-bin.zip
//!     installs/gradle-<version>/bin/<launcher>
//! ```
//!
//! The download file name and the remote cache key both derive from
//! `cache_key`, so a restored entry and a fresh download land on the same path.

use std::path::{Path, PathBuf};

/// Distribution name prefix
pub const TOOL_NAME: &str = "gradle";

/// Platform-specific name of the Gradle launcher script.
pub fn launcher_name() -> &'static str {
    if cfg!(windows) {
        "gradle.bat"
    } else {
        "gradle"
    }
}

/// Paths for downloads and installs under a provisioning root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionLayout {
    root: PathBuf,
}

impl ProvisionLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Standard layout under a job's temp directory.
    pub fn under_temp(tmp_dir: &Path) -> Self {
        Self::new(tmp_dir.join(".gradle-actions").join("gradle-installations"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn installs_dir(&self) -> PathBuf {
        self.root.join("installs")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }

    /// Cache key for a version's distribution archive: `gradle-<version>`.
    pub fn cache_key(version: &str) -> String {
        format!("{TOOL_NAME}-{version}")
    }

    /// Installation directory for a version. Its existence marks the install.
    pub fn install_dir(&self, version: &str) -> PathBuf {
        self.installs_dir().join(Self::cache_key(version))
    }

    /// Local path of a version's distribution archive.
    pub fn download_path(&self, version: &str) -> PathBuf {
        self.downloads_dir()
            .join(format!("{}-bin.zip", Self::cache_key(version)))
    }

    /// Launcher inside an installation directory.
    pub fn executable_in(install_dir: &Path) -> PathBuf {
        install_dir.join("bin").join(launcher_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_temp() {
        let layout = ProvisionLayout::under_temp(Path::new("/runner/tmp"));
        assert_eq!(
            layout.root(),
            Path::new("/runner/tmp/.gradle-actions/gradle-installations")
        );
        assert_eq!(
            layout.install_dir("8.5"),
            Path::new("/runner/tmp/.gradle-actions/gradle-installations/installs/gradle-8.5")
        );
        assert_eq!(
            layout.download_path("8.5"),
            Path::new("/runner/tmp/.gradle-actions/gradle-installations/downloads/gradle-8.5-bin.zip")
        );
    }

    #[test]
    fn test_cache_key_and_download_name_agree() {
        let layout = ProvisionLayout::new("/p");
        let key = ProvisionLayout::cache_key("8.6-rc-1");
        assert_eq!(key, "gradle-8.6-rc-1");

        let file_name = layout.download_path("8.6-rc-1");
        let file_name = file_name.file_name().unwrap().to_string_lossy();
        assert!(file_name.starts_with(&key));
    }

    #[test]
    fn test_executable_in() {
        let exe = ProvisionLayout::executable_in(Path::new("/p/installs/gradle-8.5"));
        assert!(exe.starts_with("/p/installs/gradle-8.5/bin"));
        assert_eq!(exe.file_name().unwrap(), launcher_name());
    }
}
