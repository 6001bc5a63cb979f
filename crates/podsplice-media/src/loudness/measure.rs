//! Per-speaker mean volume via sampled `volumedetect` runs.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use podsplice_models::TimeInterval;

use super::speakers::SpeakerTimeline;
use crate::edit::LoudnessPolicy;
use crate::engine::MediaEngine;
use crate::error::{MediaError, MediaResult, Stage};
use crate::metrics;

static MEAN_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mean_volume:\s*([-\d.]+)\s*dB").unwrap());

/// A speaker left out of compensation, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementGap {
    pub speaker_id: String,
    pub reason: String,
}

/// Outcome of measuring every speaker in a timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoudnessReport {
    /// Mean volume per measured speaker, in timeline order.
    pub loudness: Vec<(String, f64)>,
    pub gaps: Vec<MeasurementGap>,
}

impl LoudnessReport {
    fn record_gap(&mut self, speaker_id: String, reason: String) {
        warn!(speaker = %speaker_id, reason = %reason, "Speaker excluded from loudness compensation");
        metrics::record_measurement_gap();
        self.gaps.push(MeasurementGap { speaker_id, reason });
    }
}

/// Pick at most `max_samples` intervals spread evenly over the list, then
/// drop those too short to measure.
///
/// Sampling happens before the length filter, so a speaker with many
/// short intervals may end up with fewer than `max_samples`.
pub fn sample_intervals(intervals: &[TimeInterval], policy: &LoudnessPolicy) -> Vec<TimeInterval> {
    let picked: Vec<TimeInterval> = if intervals.len() > policy.max_samples && policy.max_samples > 0 {
        let step = intervals.len() as f64 / policy.max_samples as f64;
        (0..policy.max_samples)
            .map(|i| intervals[(i as f64 * step) as usize])
            .collect()
    } else {
        intervals.to_vec()
    };

    picked
        .into_iter()
        .filter(|i| i.duration() >= policy.min_measure_duration)
        .collect()
}

/// `aselect` over the sampled ranges followed by `volumedetect`.
pub fn build_volumedetect_filter(samples: &[TimeInterval]) -> String {
    let ranges: Vec<String> = samples
        .iter()
        .map(|i| format!("between(t,{:.3},{:.3})", i.start, i.end))
        .collect();
    format!(
        "aselect='{}',aresample=async=1,volumedetect",
        ranges.join("+")
    )
}

/// Extract `mean_volume` from `volumedetect` diagnostics.
pub fn parse_mean_volume(stderr: &str) -> Option<f64> {
    MEAN_VOLUME
        .captures(stderr)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Measures per-speaker loudness against the source recording.
pub struct SpeakerLoudnessProfile<'a> {
    policy: &'a LoudnessPolicy,
}

impl<'a> SpeakerLoudnessProfile<'a> {
    pub fn new(policy: &'a LoudnessPolicy) -> Self {
        Self { policy }
    }

    /// Measure every speaker in `timeline`.
    ///
    /// A speaker with no measurable interval, whose probe exits non-zero
    /// or times out, or whose probe prints no `mean_volume`, is recorded as
    /// a gap and skipped. A missing ffmpeg binary still aborts.
    pub async fn measure(
        &self,
        engine: &dyn MediaEngine,
        audio: &Path,
        timeline: &SpeakerTimeline,
    ) -> MediaResult<LoudnessReport> {
        let mut report = LoudnessReport::default();

        for (speaker, intervals) in timeline.iter() {
            match self.measure_speaker(engine, audio, speaker, intervals).await {
                Ok(db) => {
                    debug!(speaker, loudness_db = db, "Measured speaker loudness");
                    report.loudness.push((speaker.to_string(), db));
                }
                Err(MediaError::MeasurementGap { speaker, reason }) => {
                    report.record_gap(speaker, reason);
                }
                Err(e) if e.stage() == Some(Stage::Measure) => {
                    report.record_gap(speaker.to_string(), e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            measured = report.loudness.len(),
            gaps = report.gaps.len(),
            "Speaker loudness measured"
        );
        Ok(report)
    }

    async fn measure_speaker(
        &self,
        engine: &dyn MediaEngine,
        audio: &Path,
        speaker: &str,
        intervals: &[TimeInterval],
    ) -> MediaResult<f64> {
        let samples = sample_intervals(intervals, self.policy);
        if samples.is_empty() {
            return Err(MediaError::measurement_gap(
                speaker,
                format!("no interval of at least {}s", self.policy.min_measure_duration),
            ));
        }

        engine
            .mean_volume(audio, &samples)
            .await?
            .ok_or_else(|| MediaError::measurement_gap(speaker, "no mean_volume in probe output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(n: usize, duration: f64) -> Vec<TimeInterval> {
        (0..n)
            .map(|i| TimeInterval::new(i as f64 * 10.0, i as f64 * 10.0 + duration))
            .collect()
    }

    #[test]
    fn test_sampling_is_even_and_bounded() {
        let policy = LoudnessPolicy::default();
        let intervals = spans(90, 2.0);
        let samples = sample_intervals(&intervals, &policy);

        assert_eq!(samples.len(), 30);
        assert_eq!(samples[0], intervals[0]);
        assert_eq!(samples[1], intervals[3]);
        assert_eq!(samples[29], intervals[87]);
    }

    #[test]
    fn test_short_intervals_excluded() {
        let policy = LoudnessPolicy::default();
        let mut intervals = spans(3, 0.2);
        intervals.push(TimeInterval::new(100.0, 101.0));
        let samples = sample_intervals(&intervals, &policy);
        assert_eq!(samples, vec![TimeInterval::new(100.0, 101.0)]);
    }

    #[test]
    fn test_small_list_kept_whole() {
        let policy = LoudnessPolicy::default();
        assert_eq!(sample_intervals(&spans(5, 1.0), &policy).len(), 5);
    }

    #[test]
    fn test_volumedetect_filter() {
        let filter = build_volumedetect_filter(&[
            TimeInterval::new(1.0, 2.5),
            TimeInterval::new(10.0, 12.0),
        ]);
        assert_eq!(
            filter,
            "aselect='between(t,1.000,2.500)+between(t,10.000,12.000)',aresample=async=1,volumedetect"
        );
    }

    #[test]
    fn test_parse_mean_volume() {
        let stderr = "[Parsed_volumedetect_2 @ 0x55d] n_samples: 882000\n\
                      [Parsed_volumedetect_2 @ 0x55d] mean_volume: -23.4 dB\n\
                      [Parsed_volumedetect_2 @ 0x55d] max_volume: -3.1 dB\n";
        assert_eq!(parse_mean_volume(stderr), Some(-23.4));
        assert_eq!(parse_mean_volume("size=N/A time=00:00:10.00"), None);
    }
}
