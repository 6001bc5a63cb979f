//! Human-readable duration formatting for run summaries.

/// Format seconds into HH:MM:SS or HH:MM:SS.mmm string.
pub fn format_seconds(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Percentage of `original` removed to reach `remaining`, 0 when `original` is empty.
pub fn saved_percent(original: f64, remaining: f64) -> f64 {
    if original <= 0.0 {
        return 0.0;
    }
    ((original - remaining) / original * 100.0).max(0.0)
}
