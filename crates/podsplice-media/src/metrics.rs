//! Metrics emitted by the splice engine.
//!
//! Recording is a no-op unless the binary installs a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    // External tool metrics
    pub const TOOL_INVOCATIONS_TOTAL: &str = "podsplice_tool_invocations_total";
    pub const TOOL_FAILURES_TOTAL: &str = "podsplice_tool_failures_total";
    pub const TOOL_DURATION_SECONDS: &str = "podsplice_tool_duration_seconds";

    // Edit metrics
    pub const SEGMENTS_EXTRACTED_TOTAL: &str = "podsplice_segments_extracted_total";
    pub const DELETIONS_RESOLVED_TOTAL: &str = "podsplice_deletions_resolved_total";
    pub const MEASUREMENT_GAPS_TOTAL: &str = "podsplice_measurement_gaps_total";

    // Run metrics
    pub const RUNS_COMPLETED_TOTAL: &str = "podsplice_runs_completed_total";
    pub const RUNS_FAILED_TOTAL: &str = "podsplice_runs_failed_total";
    pub const RUN_DURATION_SECONDS: &str = "podsplice_run_duration_seconds";
}

/// Record one external tool invocation and its wall time.
pub fn record_tool_invocation(stage: &str, duration_secs: f64, success: bool) {
    let labels = [("stage", stage.to_string())];
    counter!(names::TOOL_INVOCATIONS_TOTAL, &labels).increment(1);
    histogram!(names::TOOL_DURATION_SECONDS, &labels).record(duration_secs);
    if !success {
        counter!(names::TOOL_FAILURES_TOTAL, &labels).increment(1);
    }
}

/// Record an extracted segment, labelled `copy` or `filtered`.
pub fn record_segment_extracted(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::SEGMENTS_EXTRACTED_TOTAL, &labels).increment(1);
}

/// Record the number of deletions that survived resolution.
pub fn record_deletions_resolved(count: usize) {
    counter!(names::DELETIONS_RESOLVED_TOTAL).increment(count as u64);
}

/// Record a speaker that could not be measured.
pub fn record_measurement_gap() {
    counter!(names::MEASUREMENT_GAPS_TOTAL).increment(1);
}

/// Record the outcome of a whole run.
pub fn record_run(kind: &str, duration_secs: f64, success: bool) {
    let labels = [("kind", kind.to_string())];
    if success {
        counter!(names::RUNS_COMPLETED_TOTAL, &labels).increment(1);
    } else {
        counter!(names::RUNS_FAILED_TOTAL, &labels).increment(1);
    }
    histogram!(names::RUN_DURATION_SECONDS, &labels).record(duration_secs);
}
