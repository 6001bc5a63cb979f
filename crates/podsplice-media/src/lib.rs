//! Deletion resolution and FFmpeg splice engine for podcast edits.
//!
//! This crate provides:
//! - Interval merge/complement and deletion resolution
//! - Keep-segment derivation with a checked partition invariant
//! - Adaptive boundary fades
//! - Per-speaker loudness measurement and gain compensation
//! - Sample-accurate segment assembly through FFmpeg
//! - Pause trimming on top of the same pipeline

pub mod assemble;
pub mod command;
pub mod edit;
pub mod engine;
pub mod error;
pub mod fs_utils;
pub mod loudness;
pub mod metrics;
pub mod pipeline;
pub mod probe;
pub mod silence;

pub use assemble::{AssemblyOptions, DeliveryFormat, SegmentAssembler};
pub use command::{FfmpegCommand, FfmpegRunner};
pub use edit::{DeletionResolver, EditConfig, EditList, FadeMode, KeepSegmentCalculator};
pub use engine::{FfmpegEngine, MediaEngine};
pub use error::{MediaError, MediaResult, Stage};
pub use pipeline::{
    plan_keep_segments, run_edit, run_silence_trim, EditJob, EditOutcome, EditReport, RunKind,
    TrimOutcome,
};
pub use probe::{probe_media, MediaInfo, MediaMode};
pub use silence::SilenceTrimConfig;
