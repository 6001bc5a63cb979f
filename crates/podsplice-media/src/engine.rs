//! Boundary between the edit pipeline and the external media tools.
//!
//! Everything that spawns a process goes through [`MediaEngine`]. The
//! production implementation drives `ffmpeg`/`ffprobe`; tests substitute a
//! recording fake.

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use podsplice_models::TimeInterval;

use crate::assemble::{DeliveryFormat, ExtractKind, ExtractionPlan};
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaResult, Stage};
use crate::loudness::{build_volumedetect_filter, parse_mean_volume};
use crate::probe::{probe_media, MediaInfo, MediaMode};
use crate::silence::{build_silencedetect_filter, parse_silencedetect};

/// Codec of the uncompressed intermediate every cut is made against.
pub const INTERMEDIATE_CODEC: &str = "pcm_s16le";

/// External media operations used by an edit run.
///
/// Each call blocks the run until the underlying process exits. A
/// non-zero exit surfaces as a tool failure carrying the captured
/// diagnostic output.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Duration and stream layout of a file.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Mean volume in dB over the union of `samples`.
    ///
    /// `Ok(None)` means the tool ran but reported no measurement.
    async fn mean_volume(&self, audio: &Path, samples: &[TimeInterval]) -> MediaResult<Option<f64>>;

    /// Decode the first audio stream of `source` to an uncompressed WAV.
    async fn decode_intermediate(&self, source: &Path, dest: &Path, mode: MediaMode) -> MediaResult<()>;

    /// Cut one planned segment out of the intermediate.
    async fn extract(&self, intermediate: &Path, plan: &ExtractionPlan, dest: &Path) -> MediaResult<()>;

    /// Losslessly join the files listed in a concat manifest.
    async fn concat(&self, manifest: &Path, dest: &Path) -> MediaResult<()>;

    /// Encode to the delivery format.
    async fn encode(&self, input: &Path, dest: &Path, format: &DeliveryFormat) -> MediaResult<()>;

    /// Silent stretches of at least `min_duration` seconds below `noise_db`.
    async fn detect_silences(
        &self,
        input: &Path,
        noise_db: f64,
        min_duration: f64,
    ) -> MediaResult<Vec<TimeInterval>>;
}

/// [`MediaEngine`] backed by the FFmpeg command line tools.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEngine {
    runner: FfmpegRunner,
}

impl FfmpegEngine {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &FfmpegRunner {
        &self.runner
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe_media(&self.runner, path).await
    }

    async fn mean_volume(&self, audio: &Path, samples: &[TimeInterval]) -> MediaResult<Option<f64>> {
        let cmd = FfmpegCommand::analysis(audio)
            .no_video()
            .audio_filter(build_volumedetect_filter(samples));
        let output = self.runner.run(&cmd, Stage::Measure).await?;
        Ok(parse_mean_volume(&output.stderr))
    }

    async fn decode_intermediate(&self, source: &Path, dest: &Path, mode: MediaMode) -> MediaResult<()> {
        let mut cmd = FfmpegCommand::new(source, dest).no_video();
        if mode == MediaMode::AudioWithVideo {
            cmd = cmd.map("0:a:0");
        }
        let cmd = cmd.audio_codec(INTERMEDIATE_CODEC);

        debug!(source = %source.display(), ?mode, "Decoding source to intermediate");
        self.runner.run(&cmd, Stage::Decode).await?;
        Ok(())
    }

    async fn extract(&self, intermediate: &Path, plan: &ExtractionPlan, dest: &Path) -> MediaResult<()> {
        let cmd = match &plan.kind {
            // Decode-side seek on PCM is sample accurate
            ExtractKind::Copy => FfmpegCommand::new(intermediate, dest)
                .output_seek(plan.interval.start)
                .until(plan.interval.end)
                .stream_copy(),
            ExtractKind::Filtered { filter } => FfmpegCommand::new(intermediate, dest)
                .seek(plan.interval.start)
                .duration(plan.interval.duration())
                .audio_filter(filter.clone())
                .audio_codec(INTERMEDIATE_CODEC),
        };
        self.runner.run(&cmd, Stage::Extract).await?;
        Ok(())
    }

    async fn concat(&self, manifest: &Path, dest: &Path) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(manifest, dest)
            .input_format("concat")
            .input_args(["-safe", "0"])
            .stream_copy();
        self.runner.run(&cmd, Stage::Concat).await?;
        Ok(())
    }

    async fn encode(&self, input: &Path, dest: &Path, format: &DeliveryFormat) -> MediaResult<()> {
        let mut cmd = FfmpegCommand::new(input, dest).audio_codec(format.codec);
        if let Some(bitrate) = &format.bitrate {
            cmd = cmd.audio_bitrate(bitrate.clone());
        }
        self.runner.run(&cmd, Stage::Encode).await?;
        Ok(())
    }

    async fn detect_silences(
        &self,
        input: &Path,
        noise_db: f64,
        min_duration: f64,
    ) -> MediaResult<Vec<TimeInterval>> {
        let cmd = FfmpegCommand::analysis(input)
            .no_video()
            .audio_filter(build_silencedetect_filter(noise_db, min_duration));
        let output = self.runner.run(&cmd, Stage::SilenceDetect).await?;
        Ok(parse_silencedetect(&output.stderr))
    }
}
