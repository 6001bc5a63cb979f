//! Extract, concatenate, encode.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use podsplice_models::KeepSegment;

use super::encode::DeliveryFormat;
use super::plan::ExtractionPlan;
use super::scratch::{concat_manifest, ScratchDir};
use crate::engine::MediaEngine;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::publish_output;
use crate::metrics;
use crate::probe::MediaMode;

/// Settings for one render.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Parent of the run's scratch directory.
    pub work_dir: PathBuf,
    pub mode: MediaMode,
    pub format: DeliveryFormat,
}

impl AssemblyOptions {
    pub fn new(work_dir: impl Into<PathBuf>, mode: MediaMode, format: DeliveryFormat) -> Self {
        Self {
            work_dir: work_dir.into(),
            mode,
            format,
        }
    }
}

/// What a successful render did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSummary {
    pub segments: usize,
    pub copied: usize,
    pub filtered: usize,
    pub output: PathBuf,
}

/// Renders annotated keep segments into one output file.
pub struct SegmentAssembler<'a> {
    engine: &'a dyn MediaEngine,
    options: AssemblyOptions,
}

impl<'a> SegmentAssembler<'a> {
    pub fn new(engine: &'a dyn MediaEngine, options: AssemblyOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Render `segments` of `source` to `output`.
    ///
    /// The source is decoded once to PCM and every segment is cut from
    /// that. Segments without fade or gain are stream-copied; the rest go
    /// through their filter chain. The joined result is encoded once and
    /// moved to `output` only after the encode succeeds. The scratch
    /// directory is removed on every path; a cleanup failure is logged
    /// and never replaces the render's own error.
    pub async fn render(
        &self,
        source: &Path,
        segments: &[KeepSegment],
        output: &Path,
    ) -> MediaResult<RenderSummary> {
        if segments.is_empty() {
            return Err(MediaError::input("nothing to render: no keep segments"));
        }

        let scratch = ScratchDir::create(&self.options.work_dir).await?;
        let result = self.render_in(&scratch, source, segments, output).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.cleanup() {
            warn!(path = %scratch_path.display(), "Failed to remove scratch directory: {}", e);
        }

        result
    }

    async fn render_in(
        &self,
        scratch: &ScratchDir,
        source: &Path,
        segments: &[KeepSegment],
        output: &Path,
    ) -> MediaResult<RenderSummary> {
        let intermediate = scratch.intermediate();
        self.engine
            .decode_intermediate(source, &intermediate, self.options.mode)
            .await?;
        debug!(path = %intermediate.display(), "Decoded intermediate");

        let mut parts = Vec::with_capacity(segments.len());
        let (mut copied, mut filtered) = (0, 0);

        for (index, segment) in segments.iter().enumerate() {
            let plan = ExtractionPlan::for_segment(index, segment);
            let dest = scratch.segment(index);

            self.engine.extract(&intermediate, &plan, &dest).await?;
            metrics::record_segment_extracted(plan.kind.label());

            if plan.is_copy() {
                copied += 1;
            } else {
                filtered += 1;
            }
            parts.push(dest);
        }

        info!(
            segments = parts.len(),
            copied, filtered, "Extracted keep segments"
        );

        let manifest = scratch.manifest();
        fs::write(&manifest, concat_manifest(&parts)).await?;

        let joined = scratch.joined();
        self.engine.concat(&manifest, &joined).await?;

        let format = &self.options.format;
        let staged = scratch.staged(&format.staged_file_name());
        self.engine.encode(&joined, &staged, format).await?;
        info!(codec = format.codec, bitrate = ?format.bitrate, "Encoded delivery file");

        publish_output(&staged, output).await?;

        Ok(RenderSummary {
            segments: parts.len(),
            copied,
            filtered,
            output: output.to_path_buf(),
        })
    }
}
