//! Mock download/extract tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::install::{launcher_name, ArchiveError, ArchiveTool};

const FAKE_ARCHIVE_BYTES: &[u8] = b"PK\x03\x04 fake gradle distribution";

/// Archive tool that writes placeholder files instead of touching the network.
///
/// Extracting `gradle-<v>-bin.zip` creates `<dest>/gradle-<v>/bin/<launcher>`,
/// mirroring the layout of a real distribution. The archive must exist.
#[derive(Default)]
pub struct MockArchiveTool {
    fail_download: bool,
    fail_extract: bool,
    downloads: Arc<Mutex<Vec<(String, PathBuf)>>>,
    extracts: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl MockArchiveTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_download(mut self) -> Self {
        self.fail_download = true;
        self
    }

    pub fn failing_extract(mut self) -> Self {
        self.fail_extract = true;
        self
    }

    /// Recorded `(url, dest)` pairs.
    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    pub fn extract_count(&self) -> usize {
        self.extracts.lock().unwrap().len()
    }

    fn distribution_dir_name(archive: &Path) -> Option<String> {
        let name = archive.file_name()?.to_str()?;
        name.strip_suffix("-bin.zip").map(str::to_string)
    }
}

impl ArchiveTool for MockArchiveTool {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ArchiveError> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));

        let fail = |message: &str| ArchiveError::Download {
            url: url.to_string(),
            message: message.to_string(),
        };
        if self.fail_download {
            return Err(fail("HTTP status server error (503 Service Unavailable)"));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| fail(&e.to_string()))?;
        }
        fs::write(dest, FAKE_ARCHIVE_BYTES).map_err(|e| fail(&e.to_string()))?;
        Ok(FAKE_ARCHIVE_BYTES.len() as u64)
    }

    fn extract_zip(&self, archive: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
        self.extracts
            .lock()
            .unwrap()
            .push((archive.to_path_buf(), dest_dir.to_path_buf()));

        let fail = |message: String| ArchiveError::Extract {
            archive: archive.to_path_buf(),
            message,
        };
        if self.fail_extract {
            return Err(fail("invalid Zip archive: Invalid zip header".to_string()));
        }
        if !archive.is_file() {
            return Err(fail("archive does not exist".to_string()));
        }

        let dist = Self::distribution_dir_name(archive)
            .ok_or_else(|| fail("unexpected archive name".to_string()))?;
        let bin = dest_dir.join(dist).join("bin");
        fs::create_dir_all(&bin).map_err(|e| fail(e.to_string()))?;
        fs::write(bin.join(launcher_name()), "#!/bin/sh\necho fake gradle\n")
            .map_err(|e| fail(e.to_string()))
    }
}
