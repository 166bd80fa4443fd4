//! Byte sources for upload attempts.
//!
//! An [`UploadSource`] supplies the total length and per-range reads of the
//! asset being uploaded. Memory-backed sources slice without copying;
//! file-backed sources read each part's range on demand, so a multipart
//! upload keeps at most `concurrency_limit` part buffers resident.

use std::io::SeekFrom;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::{UploadError, UploadResult};
use medialift_model::ByteRange;

/// Where the bytes of an upload come from.
///
/// Each scheduled part reads only its own disjoint range; no two workers
/// ever share a read position.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// The whole asset held in memory.
    Memory(Bytes),
    /// An asset on the local filesystem, read range-by-range.
    File(PathBuf),
}

impl UploadSource {
    /// Create a memory-backed source.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Memory(data.into())
    }

    /// Create a file-backed source.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Total length of the source in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidInput`] when a file-backed source
    /// cannot be read.
    pub async fn byte_len(&self) -> UploadResult<u64> {
        match self {
            Self::Memory(data) => Ok(data.len() as u64),
            Self::File(path) => {
                let meta = tokio::fs::metadata(path).await.map_err(|e| {
                    UploadError::invalid_input(format!(
                        "cannot read source {}: {e}",
                        path.display()
                    ))
                })?;
                Ok(meta.len())
            }
        }
    }

    /// Read one half-open byte range of the source.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidInput`] when the range cannot be read
    /// in full, including when the underlying file shrank after planning.
    pub async fn read_range(&self, range: ByteRange) -> UploadResult<Bytes> {
        match self {
            Self::Memory(data) => {
                let start = usize::try_from(range.start)
                    .map_err(|_| UploadError::invalid_input("source range start overflows"))?;
                let end = usize::try_from(range.end)
                    .map_err(|_| UploadError::invalid_input("source range end overflows"))?;
                if end > data.len() {
                    return Err(UploadError::invalid_input(format!(
                        "source range [{start}, {end}) exceeds {} available bytes",
                        data.len()
                    )));
                }
                // Bytes::slice is a refcount bump, not a copy.
                Ok(data.slice(start..end))
            }
            Self::File(path) => {
                let mut file = tokio::fs::File::open(path).await.map_err(|e| {
                    UploadError::invalid_input(format!(
                        "cannot open source {}: {e}",
                        path.display()
                    ))
                })?;
                file.seek(SeekFrom::Start(range.start)).await.map_err(|e| {
                    UploadError::invalid_input(format!(
                        "cannot seek source {}: {e}",
                        path.display()
                    ))
                })?;

                let len = usize::try_from(range.len())
                    .map_err(|_| UploadError::invalid_input("source range overflows"))?;
                let mut buf = vec![0u8; len];
                file.read_exact(&mut buf).await.map_err(|e| {
                    UploadError::invalid_input(format!(
                        "source {} truncated while reading [{}, {}): {e}",
                        path.display(),
                        range.start,
                        range.end
                    ))
                })?;

                Ok(Bytes::from(buf))
            }
        }
    }
}
