//! Image hosting for uploaded post images.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

/// Upload error.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Payload exceeds the configured limit.
    #[error("Image too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Payload size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// Payload is empty.
    #[error("Empty upload")]
    Empty,
    /// Content type is not a supported image type.
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    /// Storage failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepts image uploads and returns a public URL for each.
///
/// Implementations must be thread-safe (`Send + Sync`) to be shared across
/// request handlers.
pub trait ImageHost: Send + Sync {
    /// Store `data` and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if the payload is rejected or cannot be stored.
    fn upload(&self, data: &[u8], content_type: &str) -> Result<String, UploadError>;

    /// Largest accepted payload in bytes.
    fn max_bytes(&self) -> usize;
}

/// Filesystem image host.
///
/// Files are content-addressed: the name is the SHA-256 of the payload plus
/// an extension derived from the content type, so identical uploads share
/// one file and URL.
#[derive(Debug, Clone)]
pub struct FsImageHost {
    dir: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl FsImageHost {
    /// Create a host writing to `dir` and serving under `base_url`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>, max_bytes: usize) -> Self {
        let base_url: String = base_url.into();
        Self {
            dir: dir.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_bytes,
        }
    }

    /// Directory uploads are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn check(&self, data: &[u8], content_type: &str) -> Result<&'static str, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: data.len(),
                limit: self.max_bytes,
            });
        }
        extension(content_type).ok_or_else(|| UploadError::UnsupportedType(content_type.to_owned()))
    }
}

impl ImageHost for FsImageHost {
    fn upload(&self, data: &[u8], content_type: &str) -> Result<String, UploadError> {
        let ext = self.check(data, content_type)?;

        let mut hasher = Sha256::new();
        hasher.update(data);
        let name = format!("{}.{ext}", hex::encode(hasher.finalize()));

        // Only complete files ever appear under the hashed name.
        std::fs::create_dir_all(&self.dir)?;
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(data)?;
        file.persist(self.dir.join(&name)).map_err(|e| e.error)?;
        tracing::debug!(file = %name, size = data.len(), "Stored upload");

        Ok(format!("{}/{name}", self.base_url))
    }

    fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

/// File extension for a supported image MIME type.
///
/// Parameters such as `; charset=` are ignored. SVG is refused since it can
/// carry scripts.
fn extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}
