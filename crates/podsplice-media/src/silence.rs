//! Pause trimming.
//!
//! Long pauses are found with FFmpeg's `silencedetect`. Each keeps
//! `target` seconds, split evenly either side, and the excess becomes a
//! [`SourceTag::FastFilter`] deletion rendered like any other edit.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use podsplice_models::{DeletionRecord, SourceTag, TimeInterval};

use crate::error::{MediaError, MediaResult};

static SILENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"silence_end:\s*([\d.]+)\s*\|\s*silence_duration:\s*([\d.]+)").unwrap()
});

/// Pause detection and trimming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SilenceTrimConfig {
    /// Pauses at least this long are trimmed (seconds).
    pub threshold: f64,
    /// Length each trimmed pause keeps (seconds).
    pub target: f64,
    /// Level below which audio counts as silence (dB).
    pub noise_db: f64,
    /// Excess shorter than this is left alone (seconds).
    pub min_excess: f64,
}

impl Default for SilenceTrimConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            target: 0.6,
            noise_db: -30.0,
            min_excess: 0.01,
        }
    }
}

impl SilenceTrimConfig {
    pub fn with_threshold(mut self, secs: f64) -> Self {
        self.threshold = secs;
        self
    }

    pub fn with_target(mut self, secs: f64) -> Self {
        self.target = secs;
        self
    }

    pub fn with_noise_db(mut self, db: f64) -> Self {
        self.noise_db = db;
        self
    }

    pub fn validate(&self) -> MediaResult<()> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(MediaError::input(format!(
                "pause threshold must be positive, got {}",
                self.threshold
            )));
        }
        if !(self.target.is_finite() && self.target >= 0.0) {
            return Err(MediaError::input(format!(
                "pause target must not be negative, got {}",
                self.target
            )));
        }
        if !self.noise_db.is_finite() {
            return Err(MediaError::input("noise level must be finite"));
        }
        Ok(())
    }
}

/// Filter expression for `silencedetect`.
pub fn build_silencedetect_filter(noise_db: f64, min_duration: f64) -> String {
    format!("silencedetect=noise={}dB:d={}", noise_db, min_duration)
}

/// Completed silences from `silencedetect` diagnostics.
///
/// Only `silence_end` lines are used; a silence still open at end of
/// input is not reported.
pub fn parse_silencedetect(stderr: &str) -> Vec<TimeInterval> {
    SILENCE_END
        .captures_iter(stderr)
        .filter_map(|caps| {
            let end: f64 = caps.get(1)?.as_str().parse().ok()?;
            let duration: f64 = caps.get(2)?.as_str().parse().ok()?;
            Some(TimeInterval::new((end - duration).max(0.0), end))
        })
        .collect()
}

/// Deletions that shorten every pause to `target`.
pub fn trim_deletions(silences: &[TimeInterval], config: &SilenceTrimConfig) -> Vec<DeletionRecord> {
    let half = config.target / 2.0;
    let mut deletions: Vec<DeletionRecord> = silences
        .iter()
        .filter_map(|s| {
            let start = s.start + half;
            let end = s.end - half;
            (end > start + config.min_excess)
                .then(|| DeletionRecord::new(start, end, SourceTag::FastFilter))
        })
        .collect();
    deletions.sort_by(|a, b| a.start().total_cmp(&b.start()));
    deletions
}

/// Pause length distribution of one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauseStats {
    pub detected: usize,
    /// Under one second.
    pub short: usize,
    /// One to two seconds.
    pub medium: usize,
    /// Two seconds or more.
    pub long: usize,
    /// Total time above `target` across all pauses (seconds).
    pub excess_secs: f64,
}

impl PauseStats {
    pub fn from_silences(silences: &[TimeInterval], target: f64) -> Self {
        let mut stats = Self {
            detected: silences.len(),
            ..Self::default()
        };
        for s in silences {
            let d = s.duration();
            if d < 1.0 {
                stats.short += 1;
            } else if d < 2.0 {
                stats.medium += 1;
            } else {
                stats.long += 1;
            }
            stats.excess_secs += (d - target).max(0.0);
        }
        stats
    }
}

/// `<stem>_trimmed.<ext>` next to the input.
pub fn default_trimmed_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}_trimmed.{}", stem, ext.to_string_lossy()),
        None => format!("{}_trimmed", stem),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STDERR: &str = "\
[silencedetect @ 0x5581] silence_start: 12.3405
[silencedetect @ 0x5581] silence_end: 14.0405 | silence_duration: 1.7
size=N/A time=00:01:00.00 bitrate=N/A speed= 712x
[silencedetect @ 0x5581] silence_start: 30
[silencedetect @ 0x5581] silence_end: 30.85 | silence_duration: 0.85
[silencedetect @ 0x5581] silence_start: 58.2
";

    #[test]
    fn test_parse_silencedetect() {
        let silences = parse_silencedetect(STDERR);
        assert_eq!(silences.len(), 2);
        assert!((silences[0].start - 12.3405).abs() < 1e-9);
        assert!((silences[0].end - 14.0405).abs() < 1e-9);
        assert!((silences[1].start - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_keeps_target_around_pause() {
        let config = SilenceTrimConfig::default();
        let deletions = trim_deletions(&[TimeInterval::new(10.0, 12.0)], &config);

        assert_eq!(deletions.len(), 1);
        assert!((deletions[0].start() - 10.3).abs() < 1e-9);
        assert!((deletions[0].end() - 11.7).abs() < 1e-9);
        assert_eq!(deletions[0].source, SourceTag::FastFilter);
    }

    #[test]
    fn test_tiny_excess_is_ignored() {
        let config = SilenceTrimConfig::default();
        assert!(trim_deletions(&[TimeInterval::new(5.0, 5.605)], &config).is_empty());
    }

    #[test]
    fn test_pause_stats() {
        let silences = [
            TimeInterval::new(0.0, 0.9),
            TimeInterval::new(5.0, 6.5),
            TimeInterval::new(10.0, 13.0),
        ];
        let stats = PauseStats::from_silences(&silences, 0.6);
        assert_eq!((stats.short, stats.medium, stats.long), (1, 1, 1));
        assert!((stats.excess_secs - (0.3 + 0.9 + 2.4)).abs() < 1e-9);
    }

    #[test]
    fn test_filter_and_default_path() {
        assert_eq!(build_silencedetect_filter(-30.0, 0.8), "silencedetect=noise=-30dB:d=0.8");
        assert_eq!(
            default_trimmed_path(Path::new("/shows/ep12.mp3")),
            PathBuf::from("/shows/ep12_trimmed.mp3")
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(SilenceTrimConfig::default().validate().is_ok());
        assert!(SilenceTrimConfig::default().with_threshold(0.0).validate().is_err());
        assert!(SilenceTrimConfig::default().with_target(-1.0).validate().is_err());
    }
}
