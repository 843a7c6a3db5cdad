//! Content cache gateway
//!
//! Saves and restores a set of paths under a key. Entries are immutable once
//! written: saving to an existing key is a no-op.
//!
//! ## Layout (directory gateway)
//!
//! ```text
//! <root>/<key>.tar    archived paths, one top-level entry per path index
//! <root>/<key>.json   manifest: key, paths, sha256 of the archive
//! ```
//!
//! A restore only matches when the requested path list equals the list the
//! entry was saved with, so the same key never restores into a different
//! location.

mod directory;
mod memory;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use directory::{CacheManifest, DirectoryCacheGateway};
pub use memory::MemoryCacheGateway;

/// Cache result type
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors from cache gateway operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("path to cache does not exist: {0}")]
    MissingPath(PathBuf),

    #[error("cache entry {key} is corrupt: expected sha256 {expected}, found {actual}")]
    DigestMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("cache entry {key} is missing path index {index}")]
    IncompleteEntry { key: String, index: usize },

    #[error("cache service unavailable: {0}")]
    Unavailable(String),
}

/// Save/restore of file sets by key.
pub trait CacheGateway: Send + Sync {
    /// Restore `paths` from the entry stored under `key`.
    ///
    /// Returns the matched key on a hit and `None` on a miss.
    fn restore(&self, paths: &[PathBuf], key: &str) -> CacheResult<Option<String>>;

    /// Save `paths` under `key`.
    fn save(&self, paths: &[PathBuf], key: &str) -> CacheResult<()>;
}

/// Filesystem-safe file stem for a cache key.
pub(crate) fn key_file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub(crate) fn path_strings(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| display_path(p)).collect()
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
