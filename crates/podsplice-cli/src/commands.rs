//! Subcommand implementations.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use podsplice_media::edit::FadeMode;
use podsplice_media::silence::default_trimmed_path;
use podsplice_media::{
    plan_keep_segments, run_edit, run_silence_trim, EditJob, EditReport, FfmpegEngine,
    FfmpegRunner, MediaError, SilenceTrimConfig,
};
use podsplice_models::{
    parse_deletions, parse_word_events, DeletionRecord, KeepSegmentsDocument, SourceTag,
};
use podsplice_models::timestamp::{format_seconds, saved_percent};

use crate::cli::{CutArgs, PlanArgs, TrimArgs};
use crate::config::SpliceSettings;
use crate::error::{CliError, CliResult};

/// Read an input document; a missing file is an input error.
pub async fn read_input(path: &Path) -> CliResult<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(MediaError::FileNotFound(path.to_path_buf()).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Load one deletion source and tag every record.
pub async fn load_deletions(path: &Path, source: SourceTag) -> CliResult<Vec<DeletionRecord>> {
    let text = read_input(path).await?;
    let records = parse_deletions(&text, source)?;
    info!(path = %path.display(), source = %source, count = records.len(), "Loaded deletions");
    Ok(records)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::from)?;
    tokio::fs::write(path, json)
        .await
        .map_err(CliError::from)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn engine(settings: &SpliceSettings) -> FfmpegEngine {
    let runner = match settings.tool_timeout_secs {
        Some(secs) => FfmpegRunner::new().with_timeout(secs),
        None => FfmpegRunner::new(),
    };
    FfmpegEngine::new(runner)
}

fn bitrate_for(job: &EditJob, flag: Option<String>, settings: &SpliceSettings) -> Option<String> {
    flag.or_else(|| (job.format.extension == "mp3").then(|| settings.mp3_bitrate.clone()))
}

pub async fn cut(args: CutArgs, settings: &SpliceSettings) -> Result<()> {
    let mut deletions = load_deletions(&args.deletions, SourceTag::ManualReview).await?;
    let extra = [
        (&args.phrase_repeats, SourceTag::PhraseRepeat),
        (&args.original_deletions, SourceTag::OriginalReview),
        (&args.fast_filter, SourceTag::FastFilter),
    ];
    for (path, tag) in extra {
        if let Some(path) = path {
            deletions.extend(load_deletions(path, tag).await?);
        }
    }

    let mut job = EditJob::new(&args.source, &args.output)
        .map_err(CliError::from)?
        .with_deletions(deletions)
        .with_work_dir(args.work_dir.clone().unwrap_or_else(|| settings.work_dir.clone()))
        .with_fade_mode(if args.no_fade {
            FadeMode::ClickGuard
        } else {
            FadeMode::Adaptive
        });

    if let Some(bitrate) = bitrate_for(&job, args.bitrate.clone(), settings) {
        job = job.with_bitrate(bitrate);
    }

    if let Some(path) = &args.speakers_json {
        let text = read_input(path).await?;
        let events = parse_word_events(&text).map_err(CliError::from)?;
        job = job.with_speakers(events);
    }

    let outcome = run_edit(&engine(settings), &settings.edit_config(), job)
        .await
        .map_err(CliError::from)
        .context("edit run failed")?;

    if let Some(path) = &args.keep_segments_out {
        write_json(path, &KeepSegmentsDocument::from_segments(&outcome.segments)).await?;
        info!(path = %path.display(), "Wrote keep segments");
    }
    if let Some(path) = &args.report_out {
        write_json(path, &outcome.report).await?;
        info!(path = %path.display(), "Wrote run report");
    }

    print_summary(&outcome.report);
    Ok(())
}

pub async fn plan(args: PlanArgs, settings: &SpliceSettings) -> Result<()> {
    let deletions = load_deletions(&args.deletions, SourceTag::ManualReview).await?;
    let (edit_list, keeps) = plan_keep_segments(&settings.edit_config(), &deletions, args.duration)
        .map_err(CliError::from)?;

    let document = KeepSegmentsDocument::from_segments(&keeps);
    info!(
        deletions = edit_list.len(),
        keep_segments = document.count,
        kept = %format_seconds(args.duration - edit_list.deleted_duration()),
        "Planned keep segments"
    );

    match &args.out {
        Some(path) => write_json(path, &document).await?,
        None => println!(
            "{}",
            serde_json::to_string_pretty(&document).map_err(CliError::from)?
        ),
    }
    Ok(())
}

pub async fn trim_silences(args: TrimArgs, settings: &SpliceSettings) -> Result<()> {
    let output: PathBuf = args
        .output
        .clone()
        .unwrap_or_else(|| default_trimmed_path(&args.input));
    let trim = SilenceTrimConfig::default()
        .with_threshold(args.threshold)
        .with_target(args.target)
        .with_noise_db(args.noise);

    let mut job = EditJob::new(&args.input, &output)
        .map_err(CliError::from)?
        .with_work_dir(args.work_dir.clone().unwrap_or_else(|| settings.work_dir.clone()));
    if let Some(bitrate) = bitrate_for(&job, args.bitrate.clone(), settings) {
        job = job.with_bitrate(bitrate);
    }

    let outcome = run_silence_trim(&engine(settings), &trim, &settings.edit_config(), job)
        .await
        .map_err(CliError::from)
        .context("pause trimming failed")?;

    println!(
        "{} pauses over {}s: {} short (<1s), {} medium (1-2s), {} long (>2s), {:.1}s excess",
        outcome.stats.detected,
        args.threshold,
        outcome.stats.short,
        outcome.stats.medium,
        outcome.stats.long,
        outcome.stats.excess_secs
    );
    match &outcome.edit {
        Some(edit) => print_summary(&edit.report),
        None => println!("Nothing to trim"),
    }
    Ok(())
}

fn print_summary(report: &EditReport) {
    let remaining = report
        .final_duration
        .unwrap_or(report.original_duration - report.deleted_secs);
    println!("Wrote {}", report.output.display());
    println!(
        "  {} -> {} ({:.1}% removed, {} deletions, {} segments)",
        format_seconds(report.original_duration),
        format_seconds(remaining),
        saved_percent(report.original_duration, remaining),
        report.deletions,
        report.keep_segments
    );
    for speaker in &report.speakers {
        println!(
            "  {}: {:.1} dB, gain {:+.2} dB",
            speaker.speaker_id, speaker.measured_loudness_db, speaker.gain_db
        );
    }
    for gap in &report.measurement_gaps {
        println!("  {}: not measured ({})", gap.speaker_id, gap.reason);
    }
}
