//! Canonical deletion set from raw, possibly conflicting detector output.

use podsplice_models::{DeletionRecord, SourceTag, TimeInterval};
use tracing::{debug, info};

use super::config::EditConfig;
use super::interval_set::IntervalSet;
use crate::error::{MediaError, MediaResult};
use crate::metrics;

/// Resolved deletions for one run: sorted, non-overlapping, read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct EditList {
    deletions: Vec<DeletionRecord>,
    total_duration: f64,
}

impl EditList {
    pub fn deletions(&self) -> &[DeletionRecord] {
        &self.deletions
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn len(&self) -> usize {
        self.deletions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty()
    }

    pub fn intervals(&self) -> impl Iterator<Item = TimeInterval> + '_ {
        self.deletions.iter().map(|d| d.interval)
    }

    /// Sum of deleted time in seconds.
    pub fn deleted_duration(&self) -> f64 {
        self.deletions.iter().map(|d| d.interval.duration()).sum()
    }
}

/// Builds an [`EditList`] from any number of raw deletion sources.
pub struct DeletionResolver<'a> {
    config: &'a EditConfig,
}

impl<'a> DeletionResolver<'a> {
    pub fn new(config: &'a EditConfig) -> Self {
        Self { config }
    }

    /// Resolve raw deletions against a recording of `total_duration` seconds.
    ///
    /// Steps, in order: drop invalid and too-short deletions, merge across
    /// gaps of at most `merge_gap_threshold`, clip to the recording, then
    /// pull every end in by `boundary_epsilon`. Fails before building
    /// anything if the config is invalid, the duration is not positive, or
    /// a record is malformed.
    pub fn resolve(&self, raw: &[DeletionRecord], total_duration: f64) -> MediaResult<EditList> {
        self.config.validate()?;

        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(MediaError::input(format!(
                "total duration must be positive, got {}",
                total_duration
            )));
        }

        if let Some((index, bad)) = raw
            .iter()
            .enumerate()
            .find(|(_, r)| r.interval.is_malformed())
        {
            return Err(MediaError::input(format!(
                "malformed deletion #{} from {}: start={}, end={}",
                index,
                bad.source,
                bad.start(),
                bad.end()
            )));
        }

        let mut kept: Vec<&DeletionRecord> = raw
            .iter()
            .filter(|r| r.interval.is_valid())
            .filter(|r| r.interval.duration() >= self.config.min_delete_duration)
            .collect();
        kept.sort_by(|a, b| a.start().total_cmp(&b.start()));

        debug!(
            raw = raw.len(),
            after_filter = kept.len(),
            min_delete_duration = self.config.min_delete_duration,
            "Filtered short deletions"
        );

        let merged = IntervalSet::merge(
            kept.iter().map(|r| r.interval),
            self.config.merge_gap_threshold,
        );

        debug!(
            merged = merged.len(),
            merge_gap = self.config.merge_gap_threshold,
            "Merged neighbouring deletions"
        );

        let epsilon = self.config.boundary_epsilon;
        let mut deletions = Vec::with_capacity(merged.len());
        let mut contributors = kept.iter().peekable();

        for interval in merged.iter() {
            // Earliest-starting contributor names the merged deletion
            let mut source = None;
            while let Some(record) = contributors.peek() {
                if record.start() > interval.end {
                    break;
                }
                source.get_or_insert(record.source);
                contributors.next();
            }
            let source = source.unwrap_or(SourceTag::ManualReview);

            if interval.start >= total_duration {
                debug!(start = interval.start, "Dropping deletion past end of recording");
                continue;
            }

            let clipped = TimeInterval::new(interval.start, interval.end.min(total_duration));
            let shrunk = TimeInterval::new(clipped.start, clipped.end - epsilon);
            if !shrunk.is_valid() {
                debug!(
                    start = clipped.start,
                    end = clipped.end,
                    "Dropping deletion shorter than boundary epsilon"
                );
                continue;
            }

            deletions.push(DeletionRecord {
                interval: shrunk,
                source,
            });
        }

        let edit_list = EditList {
            deletions,
            total_duration,
        };

        metrics::record_deletions_resolved(edit_list.len());
        info!(
            raw = raw.len(),
            resolved = edit_list.len(),
            deleted_secs = format!("{:.1}", edit_list.deleted_duration()),
            total_secs = format!("{:.1}", total_duration),
            "Resolved deletion list"
        );

        Ok(edit_list)
    }
}
