//! Shared data models for the podsplice editing engine.
//!
//! This crate provides Serde-serializable types for:
//! - Time intervals and tagged deletion markers
//! - Keep segments with fade and gain annotations
//! - Speaker attribution events and loudness profiles
//! - The JSON documents exchanged with upstream review tools

pub mod deletion;
pub mod error;
pub mod interval;
pub mod segment;
pub mod speaker;
pub mod timestamp;

// Re-export common types
pub use deletion::{parse_deletions, DeletionRecord, SourceTag};
pub use error::{ModelError, ModelResult};
pub use interval::TimeInterval;
pub use segment::{FadeSpec, KeepSegment, KeepSegmentsDocument, SegmentSpan};
pub use speaker::{parse_word_events, SpeakerProfile, WordEvent, WordKind};
