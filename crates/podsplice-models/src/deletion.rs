//! Deletion markers and their JSON input document.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::interval::TimeInterval;

/// Upstream detector that produced a deletion.
///
/// Metadata only: merging never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Hand-picked in the review UI.
    ManualReview,
    /// Repeated phrase detector.
    PhraseRepeat,
    /// Strike-through marks carried over from the original review document.
    OriginalReview,
    /// Fast-mode filters (pause trimming, bulk cleanup).
    FastFilter,
}

impl SourceTag {
    /// Stable lowercase name, used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::ManualReview => "manual_review",
            SourceTag::PhraseRepeat => "phrase_repeat",
            SourceTag::OriginalReview => "original_review",
            SourceTag::FastFilter => "fast_filter",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time range marked for removal, with the detector that marked it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeletionRecord {
    pub interval: TimeInterval,
    pub source: SourceTag,
}

impl DeletionRecord {
    pub fn new(start: f64, end: f64, source: SourceTag) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            source,
        }
    }

    pub fn start(&self) -> f64 {
        self.interval.start
    }

    pub fn end(&self) -> f64 {
        self.interval.end
    }
}

#[derive(Debug, Deserialize)]
struct RawSpan {
    start: f64,
    end: f64,
}

/// Deletion input as written by the review tools.
///
/// Older tools write a bare list; the review UI wraps the same list as
/// `{"segments": [...], "editState": {...}}`. `editState` is ignored.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeletionDocument {
    Wrapped { segments: Vec<RawSpan> },
    List(Vec<RawSpan>),
}

impl DeletionDocument {
    fn into_spans(self) -> Vec<RawSpan> {
        match self {
            DeletionDocument::Wrapped { segments } => segments,
            DeletionDocument::List(segments) => segments,
        }
    }
}

/// Parse a deletion document, tagging every entry with `source`.
///
/// Inverted or tiny spans are passed through for the resolver to filter.
/// A span with a negative start is malformed and fails the whole document.
pub fn parse_deletions(json: &str, source: SourceTag) -> ModelResult<Vec<DeletionRecord>> {
    let doc: DeletionDocument = serde_json::from_str(json)?;
    doc.into_spans()
        .into_iter()
        .enumerate()
        .map(|(index, span)| {
            let record = DeletionRecord::new(span.start, span.end, source);
            if record.interval.is_malformed() {
                return Err(ModelError::malformed(index, span.start, span.end));
            }
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_list() {
        let json = r#"[{"start": 1.0, "end": 2.5}, {"start": 4, "end": 5}]"#;
        let records = parse_deletions(json, SourceTag::ManualReview).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].interval, TimeInterval::new(1.0, 2.5));
        assert_eq!(records[1].source, SourceTag::ManualReview);
    }

    #[test]
    fn test_parse_wrapped_document() {
        let json = r#"{
            "segments": [{"start": 1.0, "end": 2.5, "text": "um"}],
            "editState": {"selected": [3, 4], "version": 2}
        }"#;
        let records = parse_deletions(json, SourceTag::PhraseRepeat).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, SourceTag::PhraseRepeat);
    }

    #[test]
    fn test_both_forms_parse_identically() {
        let bare = r#"[{"start": 0.5, "end": 0.9}]"#;
        let wrapped = r#"{"segments": [{"start": 0.5, "end": 0.9}], "editState": {}}"#;
        assert_eq!(
            parse_deletions(bare, SourceTag::ManualReview).unwrap(),
            parse_deletions(wrapped, SourceTag::ManualReview).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let json = r#"[{"start": 1.0}]"#;
        assert!(parse_deletions(json, SourceTag::ManualReview).is_err());

        let json = r#"{"editState": {}}"#;
        assert!(parse_deletions(json, SourceTag::ManualReview).is_err());
    }

    #[test]
    fn test_negative_start_is_malformed() {
        let json = r#"[{"start": 1.0, "end": 2.0}, {"start": -4.0, "end": 2.0}]"#;
        let err = parse_deletions(json, SourceTag::ManualReview).unwrap_err();
        assert!(matches!(err, ModelError::MalformedInterval { index: 1, .. }));
    }

    #[test]
    fn test_inverted_spans_pass_through() {
        let json = r#"[{"start": 3.0, "end": 1.0}]"#;
        let records = parse_deletions(json, SourceTag::FastFilter).unwrap();
        assert!(!records[0].interval.is_valid());
    }
}
