//! Part-level types for multipart uploads.
//!
//! A [`PartJob`] is one planned unit of work: a 1-based part number, the
//! byte range of the source it owns, and the presigned URL it PUTs to.
//! A [`PartResult`] is the completion token the object store hands back.
//! [`CompletedPart`] is the wire spelling of that token in the
//! `complete-multipart` payload, which uses the object store's field names.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` within the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Inclusive start offset.
    pub start: u64,
    /// Exclusive end offset.
    pub end: u64,
}

impl ByteRange {
    /// Create a new range.
    ///
    /// Callers are expected to pass `start <= end`; the planner only ever
    /// constructs well-formed ranges.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// One planned unit of multipart work.
///
/// Created by the planner, consumed exactly once by the scheduler. Part
/// numbers are 1-based and contiguous; the union of all job ranges for a
/// file exactly covers `[0, file_size)` with no overlap and no gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartJob {
    /// 1-based part number.
    pub part_number: u32,
    /// The byte range of the source this part owns.
    pub range: ByteRange,
    /// Presigned URL this part PUTs to.
    pub url: String,
}

/// Completion token for one successfully uploaded part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResult {
    /// The part number this token belongs to.
    pub part_number: u32,
    /// The entity tag returned by the object store for this part.
    pub e_tag: String,
}

/// One entry of the `complete-multipart` payload.
///
/// The object store requires its own field spelling (`ETag`, `PartNumber`)
/// and parts listed in ascending part-number order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    /// The entity tag of the uploaded part.
    #[serde(rename = "ETag")]
    pub e_tag: String,
    /// The 1-based part number.
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
}

impl From<PartResult> for CompletedPart {
    fn from(result: PartResult) -> Self {
        Self {
            e_tag: result.e_tag,
            part_number: result.part_number,
        }
    }
}
