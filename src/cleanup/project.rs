//! Scratch project used to run the cleanup build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::fence::FenceTimestamp;
use super::script::InitScript;

/// Name of the scratch project and its directory
pub const PROJECT_NAME: &str = "dummy-cleanup-project";
pub const SETTINGS_FILE: &str = "settings.gradle";
pub const BUILD_FILE: &str = "build.gradle";
pub const INIT_SCRIPT_FILE: &str = "init.gradle";
/// The single task declared by the scratch build
pub const NOOP_TASK: &str = "noop";

/// A minimal Gradle project whose only purpose is to run an init script.
#[derive(Debug, Clone)]
pub struct ScratchProject {
    dir: PathBuf,
}

impl ScratchProject {
    /// Write the project under `parent`, replacing any previous content.
    pub fn create(parent: &Path, fence: FenceTimestamp) -> io::Result<Self> {
        let dir = parent.join(PROJECT_NAME);
        fs::create_dir_all(&dir)?;

        fs::write(
            dir.join(SETTINGS_FILE),
            format!("rootProject.name = \"{PROJECT_NAME}\"\n"),
        )?;
        fs::write(dir.join(BUILD_FILE), format!("task(\"{NOOP_TASK}\") {{}}\n"))?;
        fs::write(dir.join(INIT_SCRIPT_FILE), InitScript::new(fence).render())?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn init_script(&self) -> PathBuf {
        self.dir.join(INIT_SCRIPT_FILE)
    }
}
