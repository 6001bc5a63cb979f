//! Per-segment extraction decisions.

use podsplice_models::{KeepSegment, TimeInterval};

/// Fades shorter than this round to zero at millisecond precision and
/// are left out of the chain.
const MIN_RENDERED_FADE: f64 = 0.0005;

/// How one keep segment is cut from the intermediate.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractKind {
    /// Stream copy; no fade and no gain.
    Copy,
    /// Re-encode through an audio filter chain.
    Filtered { filter: String },
}

impl ExtractKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExtractKind::Copy => "copy",
            ExtractKind::Filtered { .. } => "filtered",
        }
    }
}

/// One extraction step of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionPlan {
    /// Position in the output, from zero.
    pub index: usize,
    pub interval: TimeInterval,
    pub kind: ExtractKind,
}

impl ExtractionPlan {
    pub fn for_segment(index: usize, segment: &KeepSegment) -> Self {
        let kind = if segment.is_passthrough() {
            ExtractKind::Copy
        } else {
            match build_filter_chain(segment) {
                Some(filter) => ExtractKind::Filtered { filter },
                None => ExtractKind::Copy,
            }
        };
        Self {
            index,
            interval: segment.interval(),
            kind,
        }
    }

    pub fn is_copy(&self) -> bool {
        self.kind == ExtractKind::Copy
    }
}

/// Gain, then fade-in, then fade-out. `None` when the segment needs none.
///
/// Fade-out timing is relative to the extracted segment, which starts at 0.
pub fn build_filter_chain(segment: &KeepSegment) -> Option<String> {
    let mut filters = Vec::new();

    if segment.gain_db() > 0.0 {
        filters.push(format!("volume={:.2}dB", segment.gain_db()));
    }

    let fade = segment.fade();
    if fade.fade_in >= MIN_RENDERED_FADE {
        filters.push(format!("afade=t=in:st=0:d={:.3}", fade.fade_in));
    }
    if fade.fade_out >= MIN_RENDERED_FADE {
        let start = (segment.duration() - fade.fade_out).max(0.0);
        filters.push(format!("afade=t=out:st={:.3}:d={:.3}", start, fade.fade_out));
    }

    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsplice_models::FadeSpec;

    #[test]
    fn test_passthrough_is_copy() {
        let plan = ExtractionPlan::for_segment(0, &KeepSegment::new(0.0, 12.0));
        assert!(plan.is_copy());
        assert_eq!(plan.kind.label(), "copy");
    }

    #[test]
    fn test_filter_order() {
        let seg = KeepSegment::new(10.0, 20.0)
            .with_gain_db(4.0)
            .with_fade(FadeSpec::new(0.3, 0.3));
        assert_eq!(
            build_filter_chain(&seg).unwrap(),
            "volume=4.00dB,afade=t=in:st=0:d=0.300,afade=t=out:st=9.700:d=0.300"
        );
    }

    #[test]
    fn test_fade_out_only() {
        let seg = KeepSegment::new(0.0, 1.0).with_fade(FadeSpec::new(0.0, 0.08));
        let plan = ExtractionPlan::for_segment(3, &seg);
        assert_eq!(
            plan.kind,
            ExtractKind::Filtered {
                filter: "afade=t=out:st=0.920:d=0.080".to_string()
            }
        );
        assert_eq!(plan.index, 3);
    }

    #[test]
    fn test_sub_millisecond_fades_are_dropped() {
        let seg = KeepSegment::new(5.0, 5.0008).with_fade(FadeSpec::new(0.0002, 0.0002));
        assert_eq!(build_filter_chain(&seg), None);
        assert!(ExtractionPlan::for_segment(1, &seg).is_copy());

        let seg = KeepSegment::new(5.0, 5.001)
            .with_gain_db(2.0)
            .with_fade(FadeSpec::new(0.0003, 0.0003));
        let filter = build_filter_chain(&seg).unwrap();
        assert_eq!(filter, "volume=2.00dB");
        assert!(!filter.contains("d=0.000"));
    }
}
