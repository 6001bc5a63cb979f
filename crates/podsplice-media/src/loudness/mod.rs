//! Per-speaker loudness measurement and gain compensation.

mod compensate;
mod measure;
mod speakers;

pub use compensate::{apply_gains, assign_speakers, compensate};
pub use measure::{
    build_volumedetect_filter, parse_mean_volume, sample_intervals, LoudnessReport,
    MeasurementGap, SpeakerLoudnessProfile,
};
pub use speakers::SpeakerTimeline;
