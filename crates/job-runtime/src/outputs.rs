//! Step outputs and PATH export
//!
//! Values published here are visible to later steps of the job: named
//! outputs for downstream consumers, directories prepended to PATH.

use std::env;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::heredoc_record;

/// Errors from publishing outputs
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot add {0} to PATH: {1}")]
    InvalidPath(PathBuf, String),
}

/// Sink for step outputs.
pub trait StepOutputs: Send + Sync {
    /// Publish a named output.
    fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError>;

    /// Prepend a directory to PATH for this process and later steps.
    fn add_path(&self, dir: &Path) -> Result<(), OutputError>;
}

/// Prepend `dir` to the current process PATH.
pub fn prepend_process_path(dir: &Path) -> Result<(), OutputError> {
    let current = env::var_os("PATH").unwrap_or_default();
    let mut entries = vec![dir.to_path_buf()];
    entries.extend(env::split_paths(&current));
    let joined: OsString = env::join_paths(entries)
        .map_err(|e| OutputError::InvalidPath(dir.to_path_buf(), e.to_string()))?;
    env::set_var("PATH", joined);
    Ok(())
}

/// Outputs written to the GitHub Actions command files.
#[derive(Debug, Clone)]
pub struct GithubCommandFiles {
    output_file: PathBuf,
    path_file: PathBuf,
}

impl GithubCommandFiles {
    pub fn new(output_file: impl Into<PathBuf>, path_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
            path_file: path_file.into(),
        }
    }

    /// Build from `$GITHUB_OUTPUT` and `$GITHUB_PATH`, if both are set.
    pub fn from_env() -> Option<Self> {
        let output = env::var_os("GITHUB_OUTPUT").filter(|v| !v.is_empty())?;
        let path = env::var_os("GITHUB_PATH").filter(|v| !v.is_empty())?;
        Some(Self::new(output, path))
    }

    fn append(file: &Path, content: &str) -> Result<(), OutputError> {
        let io_err = |source| OutputError::Io {
            path: file.to_path_buf(),
            source,
        };
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .map_err(io_err)?;
        handle.write_all(content.as_bytes()).map_err(io_err)
    }
}

impl StepOutputs for GithubCommandFiles {
    fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError> {
        Self::append(&self.output_file, &heredoc_record(name, value))
    }

    fn add_path(&self, dir: &Path) -> Result<(), OutputError> {
        Self::append(&self.path_file, &format!("{}\n", dir.display()))?;
        prepend_process_path(dir)
    }
}

/// Outputs for local runs: logged, and PATH applied to this process only.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutputs;

impl StepOutputs for ProcessOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError> {
        info!(name, value, "step output");
        Ok(())
    }

    fn add_path(&self, dir: &Path) -> Result<(), OutputError> {
        info!(dir = %dir.display(), "added to PATH");
        prepend_process_path(dir)
    }
}

/// Recording outputs for tests. Does not touch the process PATH.
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    outputs: Mutex<Vec<(String, String)>>,
    paths: Mutex<Vec<PathBuf>>,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value published for `name`.
    pub fn output(&self, name: &str) -> Option<String> {
        self.outputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl StepOutputs for MemoryOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError> {
        self.outputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn add_path(&self, dir: &Path) -> Result<(), OutputError> {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(dir.to_path_buf());
        Ok(())
    }
}
