//! Tuning for deletion resolution, fades and loudness compensation.
//!
//! One immutable value is built per run and passed by reference into every
//! component. The defaults are tuned for two-to-four person podcast
//! conversations edited from transcript review.

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// Adaptive fade sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FadePolicy {
    /// Segments shorter than this get no fade at all (seconds).
    pub min_fade_segment: f64,
    /// Fade as a share of segment duration for short segments.
    pub short_ratio: f64,
    /// Smallest non-zero fade (seconds).
    pub min_fade: f64,
    /// Upper bound of the "short" band (seconds).
    pub short_limit: f64,
    /// Duration at which the fade reaches `max_fade` (seconds).
    pub long_limit: f64,
    /// Fade cap (seconds).
    pub max_fade: f64,
    /// Maximum share of a segment that fade-in plus fade-out may cover.
    pub max_fade_share: f64,
    /// Fixed fade used when adaptive fades are disabled (seconds).
    ///
    /// Just long enough to suppress the click of a waveform discontinuity.
    pub click_guard: f64,
}

impl Default for FadePolicy {
    fn default() -> Self {
        Self {
            min_fade_segment: 0.3,
            short_ratio: 0.08,
            min_fade: 0.03,
            short_limit: 2.0,
            long_limit: 8.0,
            max_fade: 0.3,
            max_fade_share: 0.6,
            click_guard: 0.003,
        }
    }
}

/// Per-speaker loudness measurement and compensation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoudnessPolicy {
    /// Largest boost applied to any speaker (dB).
    pub max_gain_db: f64,
    /// Gains below this are forced to zero (dB).
    pub negligible_gain_db: f64,
    /// Maximum intervals measured per speaker.
    pub max_samples: usize,
    /// Intervals shorter than this are not measured (seconds).
    pub min_measure_duration: f64,
    /// Consecutive words of one speaker closer than this form one interval (seconds).
    pub speaker_join_gap: f64,
}

impl Default for LoudnessPolicy {
    fn default() -> Self {
        Self {
            max_gain_db: 6.0,
            negligible_gain_db: 0.5,
            max_samples: 30,
            min_measure_duration: 0.3,
            speaker_join_gap: 1.0,
        }
    }
}

/// Configuration for one editing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditConfig {
    /// Deletions shorter than this are detector noise (seconds).
    pub min_delete_duration: f64,
    /// Deletions separated by at most this gap are merged (seconds).
    ///
    /// - 0.0: merge only touching or overlapping deletions
    /// - Default (1.0): fewer splice points, short islands of speech go too
    pub merge_gap_threshold: f64,
    /// Amount trimmed from every deletion's end (seconds).
    pub boundary_epsilon: f64,
    pub fade: FadePolicy,
    pub loudness: LoudnessPolicy,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            min_delete_duration: 0.3,
            merge_gap_threshold: 1.0,
            boundary_epsilon: 0.001,
            fade: FadePolicy::default(),
            loudness: LoudnessPolicy::default(),
        }
    }
}

impl EditConfig {
    /// Configuration for pause trimming: every detected excess is cut as is.
    pub fn silence_trim() -> Self {
        Self {
            min_delete_duration: 0.0,
            merge_gap_threshold: 0.0,
            ..Self::default()
        }
    }

    /// Builder-style setter for minimum deletion duration.
    pub fn with_min_delete_duration(mut self, secs: f64) -> Self {
        self.min_delete_duration = secs;
        self
    }

    /// Builder-style setter for the merge gap.
    pub fn with_merge_gap(mut self, secs: f64) -> Self {
        self.merge_gap_threshold = secs;
        self
    }

    /// Builder-style setter for the boundary epsilon.
    pub fn with_boundary_epsilon(mut self, secs: f64) -> Self {
        self.boundary_epsilon = secs;
        self
    }

    /// Builder-style setter for the maximum speaker gain.
    pub fn with_max_gain_db(mut self, db: f64) -> Self {
        self.loudness.max_gain_db = db;
        self
    }

    /// Reject negative or non-finite tuning values.
    pub fn validate(&self) -> MediaResult<()> {
        let checks = [
            ("min_delete_duration", self.min_delete_duration),
            ("merge_gap_threshold", self.merge_gap_threshold),
            ("boundary_epsilon", self.boundary_epsilon),
            ("fade.max_fade", self.fade.max_fade),
            ("fade.max_fade_share", self.fade.max_fade_share),
            ("fade.click_guard", self.fade.click_guard),
            ("loudness.max_gain_db", self.loudness.max_gain_db),
            ("loudness.negligible_gain_db", self.loudness.negligible_gain_db),
            ("loudness.speaker_join_gap", self.loudness.speaker_join_gap),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(MediaError::input(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.fade.max_fade_share > 1.0 {
            return Err(MediaError::input("fade.max_fade_share must not exceed 1.0"));
        }
        if self.fade.long_limit <= self.fade.short_limit {
            return Err(MediaError::input(
                "fade.long_limit must be greater than fade.short_limit",
            ));
        }
        Ok(())
    }
}
