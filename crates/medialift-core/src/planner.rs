//! Part planning for multipart uploads.
//!
//! The backend is authoritative: it chooses the upload path and, for
//! multipart targets, the chunk size and part count. The planner only
//! derives byte ranges and 1-based part numbers from those values, and
//! refuses targets whose arithmetic does not add up.

use medialift_model::{ByteRange, MultipartTarget, PartJob};

use crate::error::PlanError;

/// The upload path a file is expected to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDecision {
    /// One PUT for the whole object.
    SinglePart,
    /// A multipart upload with the given number of parts.
    Multipart {
        /// `ceil(file_size / chunk_size)`.
        total_parts: u32,
    },
}

/// Decide the expected upload path for a file.
///
/// Files at or below `single_part_threshold_bytes` take the single-PUT
/// path; larger files divide into `ceil(file_size / chunk_size)` parts.
/// This mirrors the backend's policy for validation and observability; the
/// coordinator follows the backend-issued target shape, not this function.
///
/// # Errors
///
/// Returns [`PlanError::EmptySource`] for a zero-byte file and
/// [`PlanError::ZeroChunkSize`] when a multipart decision would divide by
/// zero.
pub fn plan(
    file_size_bytes: u64,
    single_part_threshold_bytes: u64,
    chunk_size_bytes: u64,
) -> Result<PlanDecision, PlanError> {
    if file_size_bytes == 0 {
        return Err(PlanError::EmptySource);
    }
    if file_size_bytes <= single_part_threshold_bytes {
        return Ok(PlanDecision::SinglePart);
    }
    let total = total_parts(file_size_bytes, chunk_size_bytes)?;
    Ok(PlanDecision::Multipart { total_parts: total })
}

/// Derive the part jobs for a multipart target.
///
/// Every part except the last spans exactly `chunk_size_bytes`; the last
/// part takes the remainder. The produced ranges exactly cover
/// `[0, file_size)` with no overlap and no gap, and part numbers are
/// 1-based and contiguous.
///
/// # Errors
///
/// Rejects empty sources, zero chunk sizes, and targets whose URL count or
/// declared part total disagrees with the derived part count.
pub fn part_jobs(file_size_bytes: u64, target: &MultipartTarget) -> Result<Vec<PartJob>, PlanError> {
    let expected = total_parts(file_size_bytes, target.chunk_size_bytes)?;

    if target.total_parts != expected {
        return Err(PlanError::TotalPartsMismatch {
            expected,
            declared: target.total_parts,
        });
    }
    if target.part_urls.len() != expected as usize {
        return Err(PlanError::PartCountMismatch {
            expected,
            actual: target.part_urls.len(),
        });
    }

    let jobs = target
        .part_urls
        .iter()
        .enumerate()
        .map(|(index, url)| {
            let start = index as u64 * target.chunk_size_bytes;
            let end = (start + target.chunk_size_bytes).min(file_size_bytes);
            PartJob {
                part_number: index as u32 + 1,
                range: ByteRange::new(start, end),
                url: url.clone(),
            }
        })
        .collect();

    Ok(jobs)
}

/// `ceil(file_size / chunk_size)` with the degenerate inputs rejected.
fn total_parts(file_size_bytes: u64, chunk_size_bytes: u64) -> Result<u32, PlanError> {
    if file_size_bytes == 0 {
        return Err(PlanError::EmptySource);
    }
    if chunk_size_bytes == 0 {
        return Err(PlanError::ZeroChunkSize);
    }
    let total = file_size_bytes.div_ceil(chunk_size_bytes);
    Ok(u32::try_from(total).unwrap_or(u32::MAX))
}
