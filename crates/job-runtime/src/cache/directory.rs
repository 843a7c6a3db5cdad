//! Directory-backed cache gateway
//!
//! Stores each entry as a tar archive plus a JSON manifest under a shared
//! root, typically on a volume that outlives individual jobs.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{key_file_stem, path_strings, CacheError, CacheGateway, CacheResult};

/// Manifest written next to each archived entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Cache key
    pub key: String,
    /// Paths archived, in archive index order
    pub paths: Vec<String>,
    /// SHA-256 of the archive file
    pub sha256: String,
    /// Archive size in bytes
    pub size_bytes: u64,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

/// Cache gateway storing entries in a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryCacheGateway {
    root: PathBuf,
}

impl DirectoryCacheGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn archive_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.tar", key_file_stem(key)))
    }

    fn manifest_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key_file_stem(key)))
    }

    /// Read the manifest for a key, if the entry exists.
    pub fn manifest(&self, key: &str) -> CacheResult<Option<CacheManifest>> {
        match fs::read_to_string(self.manifest_path(key)) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_archive(paths: &[PathBuf], archive: &Path) -> CacheResult<()> {
        let file = BufWriter::new(File::create(archive)?);
        let mut builder = tar::Builder::new(file);
        builder.follow_symlinks(false);

        for (index, path) in paths.iter().enumerate() {
            let name = index.to_string();
            if path.is_dir() {
                builder.append_dir_all(&name, path)?;
            } else if path.is_file() {
                builder.append_path_with_name(path, &name)?;
            } else {
                return Err(CacheError::MissingPath(path.clone()));
            }
        }

        builder.into_inner()?.into_inner().map_err(|e| e.into_error())?;
        Ok(())
    }

    /// Move a restored path into place, replacing whatever is there.
    fn place(src: &Path, dest: &Path) -> CacheResult<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        if dest.is_dir() {
            fs::remove_dir_all(dest)?;
        } else if dest.exists() {
            fs::remove_file(dest)?;
        }

        if fs::rename(src, dest).is_ok() {
            return Ok(());
        }

        // Staging and destination may be on different filesystems
        if src.is_dir() {
            copy_tree(src, dest)?;
        } else {
            fs::copy(src, dest)?;
        }
        Ok(())
    }
}

impl CacheGateway for DirectoryCacheGateway {
    fn restore(&self, paths: &[PathBuf], key: &str) -> CacheResult<Option<String>> {
        let Some(manifest) = self.manifest(key)? else {
            debug!(key, "no cache entry");
            return Ok(None);
        };

        if manifest.paths != path_strings(paths) {
            debug!(key, cached = ?manifest.paths, "cache entry was saved for different paths");
            return Ok(None);
        }

        let archive = self.archive_path(key);
        let actual = sha256_file(&archive)?;
        if actual != manifest.sha256 {
            return Err(CacheError::DigestMismatch {
                key: key.to_string(),
                expected: manifest.sha256,
                actual,
            });
        }

        let staging = self.root.join(format!(".staging-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&staging)?;
        let result: CacheResult<()> = (|| {
            tar::Archive::new(BufReader::new(File::open(&archive)?)).unpack(&staging)?;
            for (index, dest) in paths.iter().enumerate() {
                let src = staging.join(index.to_string());
                if !src.exists() {
                    return Err(CacheError::IncompleteEntry {
                        key: key.to_string(),
                        index,
                    });
                }
                Self::place(&src, dest)?;
            }
            Ok(())
        })();
        let _ = fs::remove_dir_all(&staging);
        result?;

        info!(key, "restored cache entry");
        Ok(Some(manifest.key))
    }

    fn save(&self, paths: &[PathBuf], key: &str) -> CacheResult<()> {
        if self.manifest(key)?.is_some() {
            debug!(key, "cache entry already exists, not saving");
            return Ok(());
        }

        fs::create_dir_all(&self.root)?;
        let tmp = self
            .root
            .join(format!(".{}.tar.{}", key_file_stem(key), uuid::Uuid::new_v4()));
        if let Err(e) = Self::write_archive(paths, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        let manifest = CacheManifest {
            key: key.to_string(),
            paths: path_strings(paths),
            sha256: sha256_file(&tmp)?,
            size_bytes: fs::metadata(&tmp)?.len(),
            created_at: Utc::now(),
        };

        // Archive first, manifest last: an entry is visible only once complete
        fs::rename(&tmp, self.archive_path(key))?;
        fs::write(self.manifest_path(key), serde_json::to_string_pretty(&manifest)?)?;

        info!(key, size_bytes = manifest.size_bytes, "saved cache entry");
        Ok(())
    }
}

fn sha256_file(path: &Path) -> CacheResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
