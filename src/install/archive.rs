//! Distribution download and extraction.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::debug;

/// Errors from downloading or extracting an archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("extraction of {archive} failed: {message}")]
    Extract { archive: PathBuf, message: String },
}

/// Fetches and unpacks distribution archives.
pub trait ArchiveTool: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ArchiveError>;

    /// Extract a zip archive into `dest_dir`.
    fn extract_zip(&self, archive: &Path, dest_dir: &Path) -> Result<(), ArchiveError>;
}

/// HTTP download with `reqwest` and zip extraction with `zip`.
pub struct HttpZipArchiveTool {
    client: Client,
}

impl HttpZipArchiveTool {
    pub fn new() -> Result<Self, ArchiveError> {
        let client = Client::builder()
            .user_agent(concat!("gradle-provision/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArchiveError::Download {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

/// Sibling path that a download is streamed to before being renamed.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name: OsString = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

impl ArchiveTool for HttpZipArchiveTool {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ArchiveError> {
        let fail = |message: String| ArchiveError::Download {
            url: url.to_string(),
            message,
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }

        debug!(url, dest = %dest.display(), "downloading");
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| fail(e.to_string()))?;

        let partial = partial_path(dest);
        let written = (|| {
            let mut writer = BufWriter::new(File::create(&partial)?);
            let written = response
                .copy_to(&mut writer)
                .map_err(std::io::Error::other)?;
            writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
            fs::rename(&partial, dest)?;
            Ok::<u64, std::io::Error>(written)
        })();

        written.map_err(|e| {
            let _ = fs::remove_file(&partial);
            fail(e.to_string())
        })
    }

    fn extract_zip(&self, archive: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
        let fail = |message: String| ArchiveError::Extract {
            archive: archive.to_path_buf(),
            message,
        };

        fs::create_dir_all(dest_dir).map_err(|e| fail(e.to_string()))?;
        let file = File::open(archive).map_err(|e| fail(e.to_string()))?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;
        debug!(archive = %archive.display(), entries = zip.len(), "extracting");
        zip.extract(dest_dir).map_err(|e| fail(e.to_string()))
    }
}
