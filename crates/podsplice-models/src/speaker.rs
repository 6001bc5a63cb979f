//! Speaker attribution input and per-speaker loudness profiles.

use serde::{Deserialize, Serialize};

use crate::error::ModelResult;

/// Measured loudness and the gain derived from it for one speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    pub speaker_id: String,
    pub measured_loudness_db: f64,
    pub gain_db: f64,
}

/// One event from the word-level transcript.
///
/// The transcript interleaves speaker-label markers (`isSpeakerLabel`),
/// silence-gap markers (`isGap`) and spoken words.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEvent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub is_speaker_label: bool,
    #[serde(default)]
    pub is_gap: bool,
}

/// Classified word event.
#[derive(Debug, Clone, PartialEq)]
pub enum WordKind<'a> {
    SpeakerLabel,
    Gap,
    Word { start: f64, end: f64, speaker: &'a str },
    /// A word without speaker attribution; carries no information here.
    Unattributed,
}

impl WordEvent {
    pub fn kind(&self) -> WordKind<'_> {
        if self.is_speaker_label {
            return WordKind::SpeakerLabel;
        }
        if self.is_gap {
            return WordKind::Gap;
        }
        match self.speaker.as_deref() {
            Some(speaker) if !speaker.is_empty() => WordKind::Word {
                start: self.start.unwrap_or(0.0),
                end: self.end.unwrap_or(0.0),
                speaker,
            },
            _ => WordKind::Unattributed,
        }
    }
}

/// Parse the word-level transcript emitted by the transcription service.
pub fn parse_word_events(json: &str) -> ModelResult<Vec<WordEvent>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_events() {
        let json = r#"[
            {"text": "[Ana]", "start": 69.4, "end": 69.4, "isSpeakerLabel": true, "speaker": "Ana"},
            {"text": "hello", "start": 69.5, "end": 69.7, "speaker": "Ana"},
            {"text": "", "start": 70.5, "end": 71.2, "isGap": true},
            {"text": "uh", "start": 71.2, "end": 71.3}
        ]"#;
        let events = parse_word_events(json).unwrap();

        assert_eq!(events[0].kind(), WordKind::SpeakerLabel);
        assert_eq!(
            events[1].kind(),
            WordKind::Word {
                start: 69.5,
                end: 69.7,
                speaker: "Ana"
            }
        );
        assert_eq!(events[2].kind(), WordKind::Gap);
        assert_eq!(events[3].kind(), WordKind::Unattributed);
    }

    #[test]
    fn test_rejects_non_list() {
        assert!(parse_word_events(r#"{"words": []}"#).is_err());
    }
}
