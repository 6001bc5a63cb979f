//! Sorted, non-overlapping interval collection.

use podsplice_models::TimeInterval;

/// Intervals sorted by start with no two closer than the gap they were
/// merged with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntervalSet {
    intervals: Vec<TimeInterval>,
}

impl IntervalSet {
    /// Merge intervals whose gap (`next.start - current.end`) is at most
    /// `gap_threshold`. A negative threshold is treated as zero, so
    /// overlapping members always merge.
    ///
    /// Invalid intervals (zero-length, inverted, non-finite) are dropped
    /// before sorting, so the result does not depend on input order.
    pub fn merge<I>(intervals: I, gap_threshold: f64) -> Self
    where
        I: IntoIterator<Item = TimeInterval>,
    {
        let gap_threshold = gap_threshold.max(0.0);
        let mut sorted: Vec<TimeInterval> =
            intervals.into_iter().filter(|i| i.is_valid()).collect();
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

        let mut iter = sorted.into_iter();
        let Some(mut current) = iter.next() else {
            return Self::default();
        };

        let mut merged = Vec::new();
        for next in iter {
            if next.start - current.end <= gap_threshold {
                // Never shrink: a contained interval leaves the end alone
                current.end = current.end.max(next.end);
            } else {
                merged.push(current);
                current = next;
            }
        }
        merged.push(current);

        Self { intervals: merged }
    }

    /// Gaps of `[0, total_duration)` not covered by this set.
    ///
    /// Members are clipped to the range first; zero-length gaps are omitted.
    pub fn complement(&self, total_duration: f64) -> IntervalSet {
        let mut gaps = Vec::with_capacity(self.intervals.len() + 1);
        let mut cursor = 0.0_f64;

        for interval in &self.intervals {
            let clipped = interval.clipped(total_duration);
            if clipped.start > cursor {
                gaps.push(TimeInterval::new(cursor, clipped.start));
            }
            cursor = cursor.max(clipped.end);
        }

        if cursor < total_duration {
            gaps.push(TimeInterval::new(cursor, total_duration));
        }

        IntervalSet { intervals: gaps }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeInterval> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[TimeInterval] {
        &self.intervals
    }

    pub fn into_vec(self) -> Vec<TimeInterval> {
        self.intervals
    }

    /// Sum of member durations.
    pub fn total_duration(&self) -> f64 {
        self.intervals.iter().map(TimeInterval::duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> TimeInterval {
        TimeInterval::new(start, end)
    }

    #[test]
    fn test_merge_example() {
        let merged = IntervalSet::merge(vec![iv(0.0, 1.0), iv(1.2, 2.0), iv(5.0, 6.0)], 1.0);
        assert_eq!(merged.as_slice(), &[iv(0.0, 2.0), iv(5.0, 6.0)]);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = IntervalSet::merge(vec![iv(5.0, 6.0), iv(0.0, 1.0), iv(1.2, 2.0)], 0.5);
        let b = IntervalSet::merge(vec![iv(0.0, 1.0), iv(1.2, 2.0), iv(5.0, 6.0)], 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_never_shrinks() {
        let merged = IntervalSet::merge(vec![iv(0.0, 10.0), iv(2.0, 3.0)], 0.0);
        assert_eq!(merged.as_slice(), &[iv(0.0, 10.0)]);
    }

    #[test]
    fn test_merge_drops_invalid() {
        let merged = IntervalSet::merge(vec![iv(1.0, 1.0), iv(3.0, 2.0), iv(4.0, 5.0)], 0.0);
        assert_eq!(merged.as_slice(), &[iv(4.0, 5.0)]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let once = IntervalSet::merge(
            vec![iv(0.0, 0.5), iv(0.9, 1.4), iv(3.0, 3.2), iv(3.1, 4.0), iv(9.0, 9.5)],
            0.4,
        );
        let twice = IntervalSet::merge(once.as_slice().to_vec(), 0.4);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_negative_gap_still_merges_overlaps() {
        let merged = IntervalSet::merge(vec![iv(0.0, 2.0), iv(1.5, 3.0), iv(3.5, 4.0)], -1.0);
        assert_eq!(merged.as_slice(), &[iv(0.0, 3.0), iv(3.5, 4.0)]);
    }

    #[test]
    fn test_complement() {
        let set = IntervalSet::merge(vec![iv(1.0, 2.0), iv(4.0, 5.0)], 0.0);
        let gaps = set.complement(6.0);
        assert_eq!(gaps.as_slice(), &[iv(0.0, 1.0), iv(2.0, 4.0), iv(5.0, 6.0)]);
    }

    #[test]
    fn test_complement_omits_zero_length_gaps() {
        let set = IntervalSet::merge(vec![iv(0.0, 2.0), iv(5.0, 6.0)], 0.0);
        let gaps = set.complement(6.0);
        assert_eq!(gaps.as_slice(), &[iv(2.0, 5.0)]);
    }

    #[test]
    fn test_complement_of_empty_set() {
        let gaps = IntervalSet::default().complement(42.0);
        assert_eq!(gaps.as_slice(), &[iv(0.0, 42.0)]);
    }

    #[test]
    fn test_complement_clips_overhang() {
        let set = IntervalSet::merge(vec![iv(8.0, 12.0), iv(15.0, 16.0)], 0.0);
        let gaps = set.complement(10.0);
        assert_eq!(gaps.as_slice(), &[iv(0.0, 8.0)]);
    }
}
