//! Adaptive crossfades at splice boundaries.
//!
//! Fade length follows the segment's own duration:
//!
//! ```text
//! fade (s)
//!  0.30 ┤                          ┌────────────
//!       │                     ╱────┘
//!  0.16 ┤               ╱────
//!       │          ╱───
//!  0.03 ┤    ┌────
//!       │    │
//!  0.00 ┼────┘
//!       └────┬─────────────┬───────────────┬──── duration (s)
//!           0.3            2               8
//! ```

use podsplice_models::{FadeSpec, KeepSegment};
use serde::{Deserialize, Serialize};

use super::config::FadePolicy;

/// How boundary fades are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeMode {
    /// Fade length scales with segment duration.
    #[default]
    Adaptive,
    /// Fixed few-millisecond fade that only suppresses clicks.
    ClickGuard,
}

/// Base fade for a segment of `duration` seconds, before clamping.
pub fn base_fade(duration: f64, policy: &FadePolicy) -> f64 {
    if duration < policy.min_fade_segment {
        return 0.0;
    }
    if duration <= policy.short_limit {
        return short_band_fade(duration, policy);
    }
    if duration < policy.long_limit {
        let at_short = short_band_fade(policy.short_limit, policy);
        let progress = (duration - policy.short_limit) / (policy.long_limit - policy.short_limit);
        return at_short + progress * (policy.max_fade - at_short);
    }
    policy.max_fade
}

fn short_band_fade(duration: f64, policy: &FadePolicy) -> f64 {
    (duration * policy.short_ratio)
        .max(policy.min_fade)
        .min(policy.max_fade)
}

/// Scale both fades by one ratio so they cover at most `max_share` of
/// the segment.
pub fn clamp_fades(fade_in: f64, fade_out: f64, duration: f64, max_share: f64) -> FadeSpec {
    let limit = duration.max(0.0) * max_share;
    let total = fade_in + fade_out;
    if total > limit && total > 0.0 {
        let ratio = limit / total;
        FadeSpec::new(fade_in * ratio, fade_out * ratio)
    } else {
        FadeSpec::new(fade_in, fade_out)
    }
}

/// Assigns a [`FadeSpec`] to every keep segment.
pub struct FadeProfile<'a> {
    policy: &'a FadePolicy,
    mode: FadeMode,
}

impl<'a> FadeProfile<'a> {
    pub fn new(policy: &'a FadePolicy, mode: FadeMode) -> Self {
        Self { policy, mode }
    }

    /// Annotate segments with fades; bounds are untouched.
    ///
    /// The first segment never fades in and the last never fades out.
    /// Both edges are computed first and clamped together afterwards.
    pub fn assign(&self, segments: Vec<KeepSegment>) -> Vec<KeepSegment> {
        let last = segments.len().saturating_sub(1);
        segments
            .into_iter()
            .enumerate()
            .map(|(i, seg)| {
                let edge = match self.mode {
                    FadeMode::Adaptive => base_fade(seg.duration(), self.policy),
                    FadeMode::ClickGuard => self.policy.click_guard,
                };
                let fade_in = if i == 0 { 0.0 } else { edge };
                let fade_out = if i == last { 0.0 } else { edge };
                let fade = clamp_fades(fade_in, fade_out, seg.duration(), self.policy.max_fade_share);
                seg.with_fade(fade)
            })
            .collect()
    }
}

/// Number of segments that fade at either edge.
pub fn faded_count(segments: &[KeepSegment]) -> usize {
    segments.iter().filter(|s| !s.fade().is_none()).count()
}
