//! Keep segments and their per-boundary annotations.

use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;

/// Fade durations applied at a keep segment's boundaries, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FadeSpec {
    pub fade_in: f64,
    pub fade_out: f64,
}

impl FadeSpec {
    pub const NONE: FadeSpec = FadeSpec {
        fade_in: 0.0,
        fade_out: 0.0,
    };

    pub fn new(fade_in: f64, fade_out: f64) -> Self {
        Self { fade_in, fade_out }
    }

    pub fn total(&self) -> f64 {
        self.fade_in + self.fade_out
    }

    /// True if neither edge fades.
    pub fn is_none(&self) -> bool {
        self.fade_in <= 0.0 && self.fade_out <= 0.0
    }
}

/// A maximal time range that survives deletion.
///
/// Bounds are fixed at construction. Fade, speaker and gain are attached
/// afterwards through the consuming `with_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeepSegment {
    start: f64,
    end: f64,
    duration: f64,
    speaker_id: Option<String>,
    fade: FadeSpec,
    gain_db: f64,
}

impl KeepSegment {
    /// Create an unannotated segment. Callers guarantee `end > start`.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            duration: end - start,
            speaker_id: None,
            fade: FadeSpec::NONE,
            gain_db: 0.0,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start, self.end)
    }

    pub fn speaker_id(&self) -> Option<&str> {
        self.speaker_id.as_deref()
    }

    pub fn fade(&self) -> FadeSpec {
        self.fade
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// True when the segment can be cut without any filter.
    pub fn is_passthrough(&self) -> bool {
        self.fade.is_none() && self.gain_db <= 0.0
    }

    pub fn with_fade(mut self, fade: FadeSpec) -> Self {
        self.fade = fade;
        self
    }

    pub fn with_speaker(mut self, speaker_id: Option<String>) -> Self {
        self.speaker_id = speaker_id;
        self
    }

    pub fn with_gain_db(mut self, gain_db: f64) -> Self {
        self.gain_db = gain_db;
        self
    }
}

/// One entry of the keep-segment output document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpan {
    pub start: f64,
    pub end: f64,
}

/// Keep-segment output: `{"segments": [{"start", "end"}], "count": n}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeepSegmentsDocument {
    pub segments: Vec<SegmentSpan>,
    pub count: usize,
}

impl KeepSegmentsDocument {
    pub fn from_segments(segments: &[KeepSegment]) -> Self {
        let spans: Vec<SegmentSpan> = segments
            .iter()
            .map(|s| SegmentSpan {
                start: s.start(),
                end: s.end(),
            })
            .collect();
        Self {
            count: spans.len(),
            segments: spans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_keep_bounds() {
        let seg = KeepSegment::new(1.0, 3.5)
            .with_fade(FadeSpec::new(0.1, 0.2))
            .with_speaker(Some("host".to_string()))
            .with_gain_db(2.5);

        assert_eq!(seg.start(), 1.0);
        assert_eq!(seg.end(), 3.5);
        assert!((seg.duration() - 2.5).abs() < 1e-12);
        assert_eq!(seg.speaker_id(), Some("host"));
        assert!(!seg.is_passthrough());
    }

    #[test]
    fn test_passthrough() {
        assert!(KeepSegment::new(0.0, 1.0).is_passthrough());
        assert!(!KeepSegment::new(0.0, 1.0).with_gain_db(1.0).is_passthrough());
    }

    #[test]
    fn test_document_shape() {
        let segments = vec![KeepSegment::new(0.0, 1.0), KeepSegment::new(2.0, 4.0)];
        let doc = KeepSegmentsDocument::from_segments(&segments);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["count"], 2);
        assert_eq!(json["segments"][1]["start"], 2.0);
        assert_eq!(json["segments"][1]["end"], 4.0);
    }
}
