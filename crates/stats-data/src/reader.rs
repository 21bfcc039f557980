//! Archive retrieval and log-member extraction.
//!
//! An [`ArchiveSource`] hands back the raw bytes of `access_{id}.zip`;
//! [`read_log_member`] opens those bytes and returns the text of the single
//! `access_{id}.log` member inside.

use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::time::Duration;

use stats_core::archives::ArchiveId;
use stats_core::error::{Result, StatsError};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

// ── ArchiveSource ─────────────────────────────────────────────────────────────

/// Anything that can produce the compressed bytes of an archive by id.
pub trait ArchiveSource: Send + Sync {
    fn fetch(&self, id: ArchiveId) -> Result<Vec<u8>>;

    /// Human-readable location, used in log output.
    fn describe(&self) -> String;
}

// ── HttpArchiveSource ─────────────────────────────────────────────────────────

/// Fetches `{base_url}/access_{id}.zip` over HTTP.
pub struct HttpArchiveSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpArchiveSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StatsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of the archive for `id`.
    pub fn url_for(&self, id: ArchiveId) -> String {
        format!("{}/{}", self.base_url, id.archive_name())
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn fetch(&self, id: ArchiveId) -> Result<Vec<u8>> {
        let url = self.url_for(id);
        debug!(archive = id.0, %url, "fetching archive");

        let response = self.client.get(&url).send().map_err(|e| StatsError::Fetch {
            archive: id.0,
            source: Box::new(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::HttpStatus {
                archive: id.0,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|e| StatsError::Fetch {
            archive: id.0,
            source: Box::new(e),
        })?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

// ── DirArchiveSource ──────────────────────────────────────────────────────────

/// Reads `access_{id}.zip` files from a local directory.
pub struct DirArchiveSource {
    root: PathBuf,
}

impl DirArchiveSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, id: ArchiveId) -> PathBuf {
        self.root.join(id.archive_name())
    }
}

impl ArchiveSource for DirArchiveSource {
    fn fetch(&self, id: ArchiveId) -> Result<Vec<u8>> {
        let path = self.path_for(id);
        debug!(archive = id.0, path = %path.display(), "reading archive");
        std::fs::read(&path).map_err(|source| StatsError::FileRead { path, source })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

// ── Member extraction ─────────────────────────────────────────────────────────

/// Open `bytes` as a zip archive and return the text of `access_{id}.log`.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn read_log_member(id: ArchiveId, bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| malformed(id, e))?;

    let member = id.member_name();
    let mut file = match archive.by_name(&member) {
        Ok(f) => f,
        Err(ZipError::FileNotFound) => {
            return Err(StatsError::MissingMember {
                archive: id.0,
                member,
            })
        }
        Err(e) => return Err(malformed(id, e)),
    };

    let mut raw = Vec::new();
    file.read_to_end(&mut raw).map_err(|e| malformed(id, e))?;

    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Fetch archive `id` from `source` and return its log text.
pub fn load_archive_text(source: &dyn ArchiveSource, id: ArchiveId) -> Result<String> {
    let bytes = source.fetch(id)?;
    read_log_member(id, &bytes)
}

fn malformed(id: ArchiveId, err: impl std::error::Error + Send + Sync + 'static) -> StatsError {
    StatsError::MalformedArchive {
        archive: id.0,
        source: Box::new(err),
    }
}

/// Write a zip archive holding one `member` with `content` at `path`.
///
/// Used to stage archives for [`DirArchiveSource`] in tests.
#[cfg(any(test, feature = "test-util"))]
pub fn write_archive(path: &std::path::Path, member: &str, content: &[u8]) -> Result<()> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let file = std::fs::File::create(path).map_err(|source| StatsError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(member, SimpleFileOptions::default())
        .map_err(|e| StatsError::Other(e.into()))?;
    zip.write_all(content)?;
    zip.finish().map_err(|e| StatsError::Other(e.into()))?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
