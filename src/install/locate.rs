//! Finding a matching Gradle already on PATH.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex_lite::Regex;
use tracing::{debug, info};

use super::layout::launcher_name;
use crate::exec::{CommandRunner, DisplayStatus};
use crate::versions::VersionInfo;

/// Probes PATH for a Gradle launcher reporting a given version.
#[derive(Clone)]
pub struct PathProbe {
    runner: Arc<dyn CommandRunner>,
    /// Search path override; the process PATH is read at probe time when unset
    search_path: Option<OsString>,
}

impl PathProbe {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            search_path: None,
        }
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// First Gradle launcher on the search path.
    pub fn find_launcher(&self) -> Option<PathBuf> {
        let search_path = match &self.search_path {
            Some(p) => p.clone(),
            None => env::var_os("PATH")?,
        };
        find_on_path(launcher_name(), &search_path)
    }

    /// The PATH launcher, if it reports exactly `info.version()`.
    ///
    /// A launcher that fails to run or exits non-zero counts as no match.
    pub fn find_matching(&self, info: &VersionInfo) -> Option<PathBuf> {
        let launcher = self.find_launcher()?;

        let output = match self.runner.run(&launcher, &["-v".to_string()], None) {
            Ok(output) if output.is_success() => output,
            Ok(output) => {
                debug!(
                    launcher = %launcher.display(),
                    status = %DisplayStatus(output.status),
                    "gradle -v failed, ignoring PATH launcher"
                );
                return None;
            }
            Err(e) => {
                debug!(error = %e, "cannot run PATH launcher");
                return None;
            }
        };

        if reports_version(&output.stdout, info.version()) {
            return Some(launcher);
        }

        if let Some(found) = reported_version(&output.stdout) {
            info!(
                "Gradle {} on PATH at {} does not match requested {}",
                found,
                launcher.display(),
                info.version()
            );
        }
        None
    }
}

/// Locate an executable file named `name` in a PATH-style list.
pub fn find_on_path(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Whether `gradle -v` output declares exactly this version.
///
/// The version line is matched whole (`\nGradle <version>\n`) so that `8.5`
/// does not match `8.5.1`.
pub fn reports_version(version_output: &str, version: &str) -> bool {
    let normalized = version_output.replace("\r\n", "\n");
    normalized.contains(&format!("\nGradle {version}\n"))
}

/// Version declared by `gradle -v` output, if any.
pub fn reported_version(version_output: &str) -> Option<String> {
    static VERSION_LINE: OnceLock<Option<Regex>> = OnceLock::new();
    VERSION_LINE
        .get_or_init(|| Regex::new(r"(?m)^Gradle (\S+)\r?$").ok())
        .as_ref()?
        .captures(version_output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
