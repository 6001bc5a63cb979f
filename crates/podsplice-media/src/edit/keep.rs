//! Keep segments as the complement of the resolved deletions.

use podsplice_models::KeepSegment;
use tracing::debug;

use super::interval_set::IntervalSet;
use super::resolver::EditList;
use crate::error::{MediaError, MediaResult};

/// Tolerance for the partition check, in seconds.
pub const PARTITION_TOLERANCE: f64 = 1e-6;

/// Derives keep segments from a finalized [`EditList`].
pub struct KeepSegmentCalculator;

impl KeepSegmentCalculator {
    /// Complement of the deletions over `[0, total_duration)`.
    ///
    /// The result is checked against the partition invariant; a failure
    /// is a logic defect and is reported as [`MediaError::InvariantViolation`].
    pub fn compute(edit_list: &EditList) -> MediaResult<Vec<KeepSegment>> {
        // Deletions are already disjoint; a zero gap only re-sorts them
        let deletions = IntervalSet::merge(edit_list.intervals(), 0.0);
        let keeps: Vec<KeepSegment> = deletions
            .complement(edit_list.total_duration())
            .iter()
            .map(|i| KeepSegment::new(i.start, i.end))
            .collect();

        verify_partition(&keeps, edit_list)?;

        debug!(
            keep_segments = keeps.len(),
            deletions = edit_list.len(),
            "Computed keep segments"
        );
        Ok(keeps)
    }
}

/// Check that keep segments and deletions tile `[0, total_duration)`.
pub fn verify_partition(keeps: &[KeepSegment], edit_list: &EditList) -> MediaResult<()> {
    for (i, seg) in keeps.iter().enumerate() {
        if seg.end() <= seg.start() {
            return Err(MediaError::invariant(format!(
                "keep segment {} is empty: [{}, {})",
                i,
                seg.start(),
                seg.end()
            )));
        }
        if seg.start() < 0.0 || seg.end() > edit_list.total_duration() + PARTITION_TOLERANCE {
            return Err(MediaError::invariant(format!(
                "keep segment {} [{}, {}) lies outside the recording",
                i,
                seg.start(),
                seg.end()
            )));
        }
    }

    for (i, pair) in keeps.windows(2).enumerate() {
        if pair[1].start() < pair[0].end() {
            return Err(MediaError::invariant(format!(
                "keep segments {} and {} overlap or are out of order",
                i,
                i + 1
            )));
        }
    }

    for seg in keeps {
        if let Some(hit) = edit_list
            .intervals()
            .find(|d| seg.interval().overlap(d) > PARTITION_TOLERANCE)
        {
            return Err(MediaError::invariant(format!(
                "keep segment [{}, {}) overlaps deletion [{}, {})",
                seg.start(),
                seg.end(),
                hit.start,
                hit.end
            )));
        }
    }

    let kept: f64 = keeps.iter().map(KeepSegment::duration).sum();
    let covered = kept + edit_list.deleted_duration();
    if (covered - edit_list.total_duration()).abs() > PARTITION_TOLERANCE {
        return Err(MediaError::invariant(format!(
            "kept {:.6}s + deleted {:.6}s != total {:.6}s",
            kept,
            edit_list.deleted_duration(),
            edit_list.total_duration()
        )));
    }

    Ok(())
}
