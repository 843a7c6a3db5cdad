//! Job-scoped state store
//!
//! State written by one step of a job is readable by later steps of the same
//! job, even when they run as separate process invocations.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::heredoc_record;

/// Errors from state store operations
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("I/O error on state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value store scoped to a single job.
pub trait JobStateStore: Send + Sync {
    /// Store a value, replacing any previous value for the key.
    fn put(&self, key: &str, value: &str) -> Result<(), StateError>;

    /// Read a value; `None` if the key was never written in this job.
    fn get(&self, key: &str) -> Result<Option<String>, StateError>;
}

/// State store backed by the GitHub Actions state file.
///
/// Writes go to `$GITHUB_STATE`, which the runner only exposes to the post
/// step of the same action (as `STATE_<key>`). Every write is mirrored into a
/// job-scoped file so separate invocations within the job can read it back.
#[derive(Debug, Clone)]
pub struct GithubStateStore {
    state_file: PathBuf,
    mirror: FileStateStore,
}

impl GithubStateStore {
    pub fn new(state_file: impl Into<PathBuf>, mirror_file: impl Into<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
            mirror: FileStateStore::new(mirror_file),
        }
    }

    /// Build from `$GITHUB_STATE`, if set, mirroring into `mirror_file`.
    pub fn from_env(mirror_file: impl Into<PathBuf>) -> Option<Self> {
        let state_file = std::env::var_os("GITHUB_STATE").filter(|v| !v.is_empty())?;
        Some(Self::new(state_file, mirror_file))
    }

    pub fn mirror_path(&self) -> &Path {
        self.mirror.path()
    }
}

impl JobStateStore for GithubStateStore {
    fn put(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.state_file)
            .map_err(|source| StateError::Io {
                path: self.state_file.clone(),
                source,
            })?;
        file.write_all(heredoc_record(key, value).as_bytes())
            .map_err(|source| StateError::Io {
                path: self.state_file.clone(),
                source,
            })?;
        self.mirror.put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let injected = std::env::var(format!("STATE_{key}"))
            .ok()
            .filter(|v| !v.is_empty());
        match injected {
            Some(value) => Ok(Some(value)),
            None => self.mirror.get(key),
        }
    }
}

/// State store persisted as a JSON object in a single file.
///
/// Used when running outside GitHub Actions; the file lives under the job's
/// temp directory so it shares the job's lifetime.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StateError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StateError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StateError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl JobStateStore for FileStateStore {
    fn put(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());

        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&entries).map_err(|source| StateError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // Write-then-rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.load()?.remove(key))
    }
}

/// In-memory state store for tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStateStore for MemoryStateStore {
    fn put(&self, key: &str, value: &str) -> Result<(), StateError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }
}
