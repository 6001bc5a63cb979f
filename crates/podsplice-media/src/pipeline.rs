//! End-to-end edit runs.
//!
//! ```text
//! probe ─► resolve ─► keep segments ─► fades ─► [loudness] ─► render ─► probe output
//! ```
//!
//! Each run gets its own `edit_run` span and scratch directory. Nothing
//! touches the filesystem until resolution and the partition check have
//! passed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use podsplice_models::{DeletionRecord, KeepSegment, SpeakerProfile, WordEvent};

use crate::assemble::{AssemblyOptions, DeliveryFormat, SegmentAssembler};
use crate::edit::{
    faded_count, DeletionResolver, EditConfig, EditList, FadeMode, FadeProfile,
    KeepSegmentCalculator,
};
use crate::engine::MediaEngine;
use crate::error::{MediaError, MediaResult};
use crate::loudness::{
    apply_gains, assign_speakers, compensate, MeasurementGap, SpeakerLoudnessProfile,
    SpeakerTimeline,
};
use crate::metrics;
use crate::silence::{trim_deletions, PauseStats, SilenceTrimConfig};

/// Which entry point started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Cut,
    TrimSilences,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Cut => "cut",
            RunKind::TrimSilences => "trim_silences",
        }
    }
}

/// Inputs of one edit run.
#[derive(Debug, Clone)]
pub struct EditJob {
    pub kind: RunKind,
    pub source: PathBuf,
    pub output: PathBuf,
    pub deletions: Vec<DeletionRecord>,
    /// Word-level transcript; enables loudness compensation when present.
    pub speakers: Option<Vec<WordEvent>>,
    pub fade_mode: FadeMode,
    pub format: DeliveryFormat,
    pub work_dir: PathBuf,
}

impl EditJob {
    /// A cut of `source` into `output`, format taken from the output extension.
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> MediaResult<Self> {
        let output = output.into();
        let format = DeliveryFormat::from_path(&output)?;
        Ok(Self {
            kind: RunKind::Cut,
            source: source.into(),
            output,
            deletions: Vec::new(),
            speakers: None,
            fade_mode: FadeMode::Adaptive,
            format,
            work_dir: std::env::temp_dir(),
        })
    }

    pub fn with_deletions(mut self, deletions: impl IntoIterator<Item = DeletionRecord>) -> Self {
        self.deletions.extend(deletions);
        self
    }

    pub fn with_speakers(mut self, events: Vec<WordEvent>) -> Self {
        self.speakers = Some(events);
        self
    }

    pub fn with_fade_mode(mut self, mode: FadeMode) -> Self {
        self.fade_mode = mode;
        self
    }

    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.format = self.format.with_bitrate(bitrate);
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    fn with_kind(mut self, kind: RunKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct EditReport {
    pub run_id: Uuid,
    pub kind: RunKind,
    pub source: PathBuf,
    pub output: PathBuf,
    pub original_duration: f64,
    /// Probed from the output; `None` if that probe failed.
    pub final_duration: Option<f64>,
    pub deletions: usize,
    pub deleted_secs: f64,
    pub keep_segments: usize,
    pub copied_segments: usize,
    pub filtered_segments: usize,
    pub faded_segments: usize,
    pub speakers: Vec<SpeakerProfile>,
    pub measurement_gaps: Vec<MeasurementGap>,
    pub finished_at: DateTime<Utc>,
}

/// A run's report plus the segments it rendered.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub report: EditReport,
    pub segments: Vec<KeepSegment>,
}

/// Resolve deletions and derive keep segments. Performs no media work.
pub fn plan_keep_segments(
    config: &EditConfig,
    raw: &[DeletionRecord],
    total_duration: f64,
) -> MediaResult<(EditList, Vec<KeepSegment>)> {
    config.validate()?;
    let edit_list = DeletionResolver::new(config).resolve(raw, total_duration)?;
    let keeps = KeepSegmentCalculator::compute(&edit_list)?;
    Ok((edit_list, keeps))
}

/// Run a complete edit: at most one output file is produced.
pub async fn run_edit(
    engine: &dyn MediaEngine,
    config: &EditConfig,
    job: EditJob,
) -> MediaResult<EditOutcome> {
    let run_id = Uuid::new_v4();
    let span = info_span!("edit_run", run_id = %run_id, kind = job.kind.as_str());
    let kind = job.kind;
    let started = Instant::now();

    let result = execute(engine, config, job, run_id).instrument(span).await;

    metrics::record_run(kind.as_str(), started.elapsed().as_secs_f64(), result.is_ok());
    result
}

async fn execute(
    engine: &dyn MediaEngine,
    config: &EditConfig,
    job: EditJob,
    run_id: Uuid,
) -> MediaResult<EditOutcome> {
    if !tokio::fs::try_exists(&job.source).await? {
        return Err(MediaError::FileNotFound(job.source.clone()));
    }
    config.validate()?;

    let info = engine.probe(&job.source).await?;
    if !info.has_audio {
        return Err(MediaError::input(format!(
            "{} has no audio stream",
            job.source.display()
        )));
    }
    info!(
        source = %job.source.display(),
        duration = info.duration,
        mode = ?info.mode(),
        "Probed source"
    );

    let (edit_list, keeps) = plan_keep_segments(config, &job.deletions, info.duration)?;
    let segments = FadeProfile::new(&config.fade, job.fade_mode).assign(keeps);

    let (segments, speakers, measurement_gaps) = match &job.speakers {
        Some(events) => compensate_loudness(engine, config, &job.source, events, segments).await?,
        None => (segments, Vec::new(), Vec::new()),
    };

    let options = AssemblyOptions::new(&job.work_dir, info.mode(), job.format.clone());
    let summary = SegmentAssembler::new(engine, options)
        .render(&job.source, &segments, &job.output)
        .await?;

    let final_duration = match engine.probe(&job.output).await {
        Ok(out) => Some(out.duration),
        Err(e) => {
            warn!(output = %job.output.display(), "Could not probe rendered output: {}", e);
            None
        }
    };

    let report = EditReport {
        run_id,
        kind: job.kind,
        source: job.source,
        output: summary.output,
        original_duration: info.duration,
        final_duration,
        deletions: edit_list.len(),
        deleted_secs: edit_list.deleted_duration(),
        keep_segments: summary.segments,
        copied_segments: summary.copied,
        filtered_segments: summary.filtered,
        faded_segments: faded_count(&segments),
        speakers,
        measurement_gaps,
        finished_at: Utc::now(),
    };

    info!(
        deletions = report.deletions,
        keep_segments = report.keep_segments,
        deleted_secs = format!("{:.1}", report.deleted_secs),
        final_duration = ?report.final_duration,
        "Edit run complete"
    );

    Ok(EditOutcome { report, segments })
}

async fn compensate_loudness(
    engine: &dyn MediaEngine,
    config: &EditConfig,
    source: &Path,
    events: &[WordEvent],
    segments: Vec<KeepSegment>,
) -> MediaResult<(Vec<KeepSegment>, Vec<SpeakerProfile>, Vec<MeasurementGap>)> {
    let timeline = SpeakerTimeline::from_events(events, config.loudness.speaker_join_gap);
    if timeline.is_empty() {
        warn!("Speaker transcript has no attributed words, skipping loudness compensation");
        return Ok((segments, Vec::new(), Vec::new()));
    }

    let report = SpeakerLoudnessProfile::new(&config.loudness)
        .measure(engine, source, &timeline)
        .await?;
    let profiles = compensate(&report, &config.loudness);

    for profile in &profiles {
        info!(
            speaker = %profile.speaker_id,
            loudness_db = profile.measured_loudness_db,
            gain_db = profile.gain_db,
            "Speaker gain"
        );
    }

    let segments = apply_gains(assign_speakers(segments, &timeline), &profiles);
    Ok((segments, profiles, report.gaps))
}

/// Outcome of a pause-trimming run.
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub stats: PauseStats,
    /// `None` when no pause needed trimming and nothing was written.
    pub edit: Option<EditOutcome>,
}

/// Shorten every long pause in `input` and write the result to `output`.
///
/// Uses the regular edit path with no minimum deletion length, no merging
/// and click-guard fades. `output` may equal `input`.
pub async fn run_silence_trim(
    engine: &dyn MediaEngine,
    trim: &SilenceTrimConfig,
    base: &EditConfig,
    job: EditJob,
) -> MediaResult<TrimOutcome> {
    if !tokio::fs::try_exists(&job.source).await? {
        return Err(MediaError::FileNotFound(job.source.clone()));
    }
    trim.validate()?;

    let silences = engine
        .detect_silences(&job.source, trim.noise_db, trim.threshold)
        .await?;
    let stats = PauseStats::from_silences(&silences, trim.target);
    info!(
        pauses = stats.detected,
        short = stats.short,
        medium = stats.medium,
        long = stats.long,
        excess_secs = format!("{:.1}", stats.excess_secs),
        "Scanned for long pauses"
    );

    let deletions = trim_deletions(&silences, trim);
    if deletions.is_empty() {
        info!("No pause needs trimming");
        return Ok(TrimOutcome { stats, edit: None });
    }

    let config = EditConfig {
        fade: base.fade.clone(),
        boundary_epsilon: base.boundary_epsilon,
        ..EditConfig::silence_trim()
    };
    let job = job
        .with_kind(RunKind::TrimSilences)
        .with_deletions(deletions)
        .with_fade_mode(FadeMode::ClickGuard);

    let edit = run_edit(engine, &config, job).await?;
    Ok(TrimOutcome {
        stats,
        edit: Some(edit),
    })
}
