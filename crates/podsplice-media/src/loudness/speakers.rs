//! Per-speaker interval lists from the word-level transcript.

use podsplice_models::{TimeInterval, WordEvent, WordKind};

/// Speech intervals per speaker, in first-encountered speaker order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakerTimeline {
    speakers: Vec<(String, Vec<TimeInterval>)>,
}

impl SpeakerTimeline {
    /// Collapse consecutive words of one speaker into speech intervals.
    ///
    /// A run continues while the next word belongs to the same speaker and
    /// starts less than `join_gap` seconds after the run's end. Label and
    /// gap markers and unattributed words are skipped.
    pub fn from_events(events: &[WordEvent], join_gap: f64) -> Self {
        let mut timeline = Self::default();
        let mut current: Option<(&str, f64, f64)> = None;

        for event in events {
            let WordKind::Word { start, end, speaker } = event.kind() else {
                continue;
            };

            current = match current {
                Some((who, run_start, run_end)) if who == speaker && start - run_end < join_gap => {
                    Some((who, run_start, run_end.max(end)))
                }
                Some((who, run_start, run_end)) => {
                    timeline.push(who, TimeInterval::new(run_start, run_end));
                    Some((speaker, start, end))
                }
                None => Some((speaker, start, end)),
            };
        }

        if let Some((who, run_start, run_end)) = current {
            timeline.push(who, TimeInterval::new(run_start, run_end));
        }

        timeline
    }

    fn push(&mut self, speaker: &str, interval: TimeInterval) {
        if !interval.is_valid() {
            return;
        }
        match self.speakers.iter_mut().find(|(id, _)| id == speaker) {
            Some((_, intervals)) => intervals.push(interval),
            None => self.speakers.push((speaker.to_string(), vec![interval])),
        }
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    /// Speakers and their intervals in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TimeInterval])> {
        self.speakers
            .iter()
            .map(|(id, intervals)| (id.as_str(), intervals.as_slice()))
    }

    pub fn intervals_for(&self, speaker: &str) -> Option<&[TimeInterval]> {
        self.speakers
            .iter()
            .find(|(id, _)| id == speaker)
            .map(|(_, intervals)| intervals.as_slice())
    }

    /// Speaker with the greatest total overlap with `range`.
    ///
    /// Ties go to the speaker encountered first in the transcript. Returns
    /// `None` when nobody speaks during `range`.
    pub fn dominant_speaker(&self, range: TimeInterval) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (id, intervals) in self.iter() {
            let overlap: f64 = intervals.iter().map(|i| i.overlap(&range)).sum();
            if overlap <= 0.0 {
                continue;
            }
            // Strict comparison keeps the earlier speaker on a tie
            if best.map_or(true, |(_, top)| overlap > top) {
                best = Some((id, overlap));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsplice_models::parse_word_events;

    fn word(speaker: &str, start: f64, end: f64) -> WordEvent {
        WordEvent {
            text: Some("w".to_string()),
            start: Some(start),
            end: Some(end),
            speaker: Some(speaker.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_runs_join_within_gap() {
        let events = vec![
            word("Ana", 0.0, 0.5),
            word("Ana", 0.8, 1.4),
            word("Ana", 3.0, 3.5),
            word("Ben", 3.6, 4.0),
            word("Ana", 4.2, 5.0),
        ];
        let timeline = SpeakerTimeline::from_events(&events, 1.0);

        assert_eq!(timeline.len(), 2);
        assert_eq!(
            timeline.intervals_for("Ana").unwrap(),
            &[
                TimeInterval::new(0.0, 1.4),
                TimeInterval::new(3.0, 3.5),
                TimeInterval::new(4.2, 5.0)
            ]
        );
        assert_eq!(timeline.intervals_for("Ben").unwrap(), &[TimeInterval::new(3.6, 4.0)]);
    }

    #[test]
    fn test_markers_are_skipped() {
        let json = r#"[
            {"text": "[Ana]", "start": 0.0, "end": 0.0, "isSpeakerLabel": true, "speaker": "Ana"},
            {"text": "hi", "start": 0.1, "end": 0.4, "speaker": "Ana"},
            {"text": "", "start": 0.4, "end": 0.9, "isGap": true},
            {"text": "there", "start": 0.9, "end": 1.2, "speaker": "Ana"},
            {"text": "um", "start": 1.3, "end": 1.4}
        ]"#;
        let events = parse_word_events(json).unwrap();
        let timeline = SpeakerTimeline::from_events(&events, 1.0);

        assert_eq!(timeline.intervals_for("Ana").unwrap(), &[TimeInterval::new(0.1, 1.2)]);
    }

    #[test]
    fn test_first_encountered_order() {
        let events = vec![word("Zoe", 0.0, 1.0), word("Adam", 2.0, 3.0)];
        let timeline = SpeakerTimeline::from_events(&events, 1.0);
        let order: Vec<&str> = timeline.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["Zoe", "Adam"]);
    }

    #[test]
    fn test_dominant_speaker_and_tie_break() {
        let events = vec![word("Ana", 0.0, 2.0), word("Ben", 2.0, 4.0), word("Ana", 6.0, 7.0)];
        let timeline = SpeakerTimeline::from_events(&events, 0.5);

        assert_eq!(timeline.dominant_speaker(TimeInterval::new(0.0, 3.0)), Some("Ana"));
        assert_eq!(timeline.dominant_speaker(TimeInterval::new(1.5, 4.0)), Some("Ben"));
        // One second each: Ana was encountered first
        assert_eq!(timeline.dominant_speaker(TimeInterval::new(1.0, 3.0)), Some("Ana"));
        assert_eq!(timeline.dominant_speaker(TimeInterval::new(4.5, 5.5)), None);
    }
}
