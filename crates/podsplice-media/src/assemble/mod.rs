//! Segment assembly: decode once, cut, join, encode once.

mod encode;
mod plan;
mod render;
mod scratch;

pub use encode::{DeliveryFormat, DEFAULT_MP3_BITRATE};
pub use plan::{build_filter_chain, ExtractKind, ExtractionPlan};
pub use render::{AssemblyOptions, RenderSummary, SegmentAssembler};
pub use scratch::{concat_manifest, ScratchDir};
