//! In-memory cache gateway with failure injection, for tests.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{CacheError, CacheGateway, CacheResult};

/// Cache gateway holding file contents in memory.
///
/// Only regular files are supported; each entry maps path index to bytes.
#[derive(Debug, Default)]
pub struct MemoryCacheGateway {
    entries: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    fail_restore: bool,
    fail_save: bool,
    restore_calls: AtomicUsize,
    save_calls: AtomicUsize,
}

impl MemoryCacheGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry with the contents of each path.
    pub fn with_entry(self, key: &str, contents: Vec<Vec<u8>>) -> Self {
        self.lock().insert(key.to_string(), contents);
        self
    }

    /// Make every restore fail.
    pub fn failing_restore(mut self) -> Self {
        self.fail_restore = true;
        self
    }

    /// Make every save fail.
    pub fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn restore_count(&self) -> usize {
        self.restore_calls.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Vec<u8>>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheGateway for MemoryCacheGateway {
    fn restore(&self, paths: &[PathBuf], key: &str) -> CacheResult<Option<String>> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_restore {
            return Err(CacheError::Unavailable("injected restore failure".to_string()));
        }

        let entries = self.lock();
        let Some(contents) = entries.get(key) else {
            return Ok(None);
        };
        if contents.len() != paths.len() {
            return Ok(None);
        }
        for (path, bytes) in paths.iter().zip(contents) {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)?;
        }
        Ok(Some(key.to_string()))
    }

    fn save(&self, paths: &[PathBuf], key: &str) -> CacheResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_save {
            return Err(CacheError::Unavailable("injected save failure".to_string()));
        }

        let mut contents = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.is_file() {
                return Err(CacheError::MissingPath(path.clone()));
            }
            contents.push(fs::read(path)?);
        }
        self.lock().entry(key.to_string()).or_insert(contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counts_calls_and_injects_failures() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.zip");
        let gateway = MemoryCacheGateway::new().failing_restore();

        assert!(gateway.restore(&[path.clone()], "k").is_err());
        assert_eq!(gateway.restore_count(), 1);
        assert_eq!(gateway.save_count(), 0);
    }

    #[test]
    fn test_restore_writes_preloaded_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloads/a.zip");
        let gateway = MemoryCacheGateway::new().with_entry("k", vec![b"cached".to_vec()]);

        assert_eq!(gateway.restore(&[path.clone()], "k").unwrap().as_deref(), Some("k"));
        assert_eq!(fs::read(&path).unwrap(), b"cached");
    }
}
