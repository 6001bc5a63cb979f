//! Run settings from the environment.

use std::path::PathBuf;

use podsplice_media::assemble::DEFAULT_MP3_BITRATE;
use podsplice_media::EditConfig;

use crate::error::{CliError, CliResult};

/// Settings shared by every subcommand. Command-line flags override them.
#[derive(Debug, Clone)]
pub struct SpliceSettings {
    /// Parent of per-run scratch directories
    pub work_dir: PathBuf,
    /// Deadline for a single external tool invocation
    pub tool_timeout_secs: Option<u64>,
    pub min_delete_secs: f64,
    pub merge_gap_secs: f64,
    pub boundary_epsilon_secs: f64,
    pub max_gain_db: f64,
    /// Bitrate for MP3 output
    pub mp3_bitrate: String,
    /// Where to write a Prometheus snapshot at exit
    pub metrics_path: Option<PathBuf>,
}

impl Default for SpliceSettings {
    fn default() -> Self {
        let edit = EditConfig::default();
        Self {
            work_dir: std::env::temp_dir().join("podsplice"),
            tool_timeout_secs: None,
            min_delete_secs: edit.min_delete_duration,
            merge_gap_secs: edit.merge_gap_threshold,
            boundary_epsilon_secs: edit.boundary_epsilon,
            max_gain_db: edit.loudness.max_gain_db,
            mp3_bitrate: DEFAULT_MP3_BITRATE.to_string(),
            metrics_path: None,
        }
    }
}

impl SpliceSettings {
    /// Create settings from `SPLICE_*` environment variables.
    pub fn from_env() -> CliResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create settings from any key lookup. Unset keys take the default;
    /// set but unparsable keys are an error.
    pub fn from_lookup<F>(lookup: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let settings = Self {
            work_dir: lookup("SPLICE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            tool_timeout_secs: parse(&lookup, "SPLICE_TOOL_TIMEOUT_SECS")?,
            min_delete_secs: parse(&lookup, "SPLICE_MIN_DELETE_SECS")?
                .unwrap_or(defaults.min_delete_secs),
            merge_gap_secs: parse(&lookup, "SPLICE_MERGE_GAP_SECS")?
                .unwrap_or(defaults.merge_gap_secs),
            boundary_epsilon_secs: parse(&lookup, "SPLICE_BOUNDARY_EPSILON_SECS")?
                .unwrap_or(defaults.boundary_epsilon_secs),
            max_gain_db: parse(&lookup, "SPLICE_MAX_GAIN_DB")?.unwrap_or(defaults.max_gain_db),
            mp3_bitrate: lookup("SPLICE_MP3_BITRATE").unwrap_or(defaults.mp3_bitrate),
            metrics_path: lookup("SPLICE_METRICS_PATH").map(PathBuf::from),
        };

        settings.edit_config().validate()?;
        Ok(settings)
    }

    /// Edit tuning derived from these settings.
    pub fn edit_config(&self) -> EditConfig {
        EditConfig::default()
            .with_min_delete_duration(self.min_delete_secs)
            .with_merge_gap(self.merge_gap_secs)
            .with_boundary_epsilon(self.boundary_epsilon_secs)
            .with_max_gain_db(self.max_gain_db)
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> CliResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CliError::config(format!("{} has an invalid value: {:?}", key, raw))),
    }
}
