//! Edit resolution: raw deletions to annotated keep segments.
//!
//! ```text
//! raw deletions ─► DeletionResolver ─► EditList ─► KeepSegmentCalculator ─► FadeProfile
//! ```

mod config;
mod fade;
mod interval_set;
mod keep;
mod resolver;

pub use config::{EditConfig, FadePolicy, LoudnessPolicy};
pub use fade::{base_fade, clamp_fades, faded_count, FadeMode, FadeProfile};
pub use interval_set::IntervalSet;
pub use keep::{verify_partition, KeepSegmentCalculator, PARTITION_TOLERANCE};
pub use resolver::{DeletionResolver, EditList};
