//! Time intervals in seconds.

use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)` in seconds.
///
/// Construction does not validate; callers normalise collections with
/// [`TimeInterval::is_valid`] and drop anything that fails it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl TimeInterval {
    /// Create a new interval.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Duration in seconds. Negative for inverted intervals.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when both bounds are finite and `end > start`.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    /// True when either bound is NaN or infinite, or the start is negative.
    ///
    /// Malformed intervals are rejected outright; inverted or zero-length
    /// ones are merely dropped.
    pub fn is_malformed(&self) -> bool {
        !self.start.is_finite() || !self.end.is_finite() || self.start < 0.0
    }

    /// Length of the intersection with `other`, zero when disjoint.
    pub fn overlap(&self, other: &TimeInterval) -> f64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).max(0.0)
    }

    /// Clip this interval to `[0, limit]`.
    pub fn clipped(&self, limit: f64) -> TimeInterval {
        TimeInterval {
            start: self.start.clamp(0.0, limit),
            end: self.end.clamp(0.0, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(TimeInterval::new(0.0, 1.0).is_valid());
        assert!(!TimeInterval::new(1.0, 1.0).is_valid());
        assert!(!TimeInterval::new(2.0, 1.0).is_valid());
        assert!(!TimeInterval::new(f64::NAN, 1.0).is_valid());
    }

    #[test]
    fn test_malformed() {
        assert!(TimeInterval::new(-0.5, 1.0).is_malformed());
        assert!(TimeInterval::new(0.0, f64::INFINITY).is_malformed());
        // Inverted but finite is droppable, not malformed
        assert!(!TimeInterval::new(3.0, 1.0).is_malformed());
    }

    #[test]
    fn test_overlap() {
        let a = TimeInterval::new(0.0, 2.0);
        assert!((a.overlap(&TimeInterval::new(1.0, 3.0)) - 1.0).abs() < 1e-12);
        assert_eq!(a.overlap(&TimeInterval::new(2.0, 3.0)), 0.0);
        assert_eq!(a.overlap(&TimeInterval::new(5.0, 6.0)), 0.0);
    }
}
