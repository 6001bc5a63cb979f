//! Gain compensation relative to the loudest speaker.

use podsplice_models::{KeepSegment, SpeakerProfile};

use super::measure::LoudnessReport;
use super::speakers::SpeakerTimeline;
use crate::edit::LoudnessPolicy;

/// Derive a gain for every measured speaker.
///
/// The loudest speaker is the 0 dB reference. Everyone else is boosted
/// by the difference, capped at `max_gain_db`; boosts below
/// `negligible_gain_db` become exactly zero. Gains are rounded to 0.01 dB.
pub fn compensate(report: &LoudnessReport, policy: &LoudnessPolicy) -> Vec<SpeakerProfile> {
    let Some(loudest) = report
        .loudness
        .iter()
        .map(|(_, db)| *db)
        .reduce(f64::max)
    else {
        return Vec::new();
    };

    report
        .loudness
        .iter()
        .map(|(speaker, db)| {
            let gain = (loudest - db).min(policy.max_gain_db).max(0.0);
            let gain = if gain < policy.negligible_gain_db {
                0.0
            } else {
                (gain * 100.0).round() / 100.0
            };
            SpeakerProfile {
                speaker_id: speaker.clone(),
                measured_loudness_db: *db,
                gain_db: gain,
            }
        })
        .collect()
}

/// Attribute each segment to the speaker with the most overlap.
pub fn assign_speakers(segments: Vec<KeepSegment>, timeline: &SpeakerTimeline) -> Vec<KeepSegment> {
    segments
        .into_iter()
        .map(|seg| {
            let speaker = timeline.dominant_speaker(seg.interval()).map(str::to_string);
            seg.with_speaker(speaker)
        })
        .collect()
}

/// Attach each segment's speaker gain. Unknown or unmeasured speakers get 0 dB.
pub fn apply_gains(segments: Vec<KeepSegment>, profiles: &[SpeakerProfile]) -> Vec<KeepSegment> {
    segments
        .into_iter()
        .map(|seg| {
            let gain = seg
                .speaker_id()
                .and_then(|id| profiles.iter().find(|p| p.speaker_id == id))
                .map_or(0.0, |p| p.gain_db);
            seg.with_gain_db(gain)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsplice_models::WordEvent;

    fn report(values: &[(&str, f64)]) -> LoudnessReport {
        LoudnessReport {
            loudness: values.iter().map(|(id, db)| (id.to_string(), *db)).collect(),
            gaps: Vec::new(),
        }
    }

    fn gain(profiles: &[SpeakerProfile], id: &str) -> f64 {
        profiles.iter().find(|p| p.speaker_id == id).unwrap().gain_db
    }

    #[test]
    fn test_gain_relative_to_loudest() {
        let profiles = compensate(&report(&[("A", -10.0), ("B", -14.0)]), &LoudnessPolicy::default());
        assert_eq!(gain(&profiles, "A"), 0.0);
        assert_eq!(gain(&profiles, "B"), 4.0);
    }

    #[test]
    fn test_gain_is_clamped() {
        let profiles = compensate(&report(&[("A", -10.0), ("B", -19.0)]), &LoudnessPolicy::default());
        assert_eq!(gain(&profiles, "A"), 0.0);
        assert_eq!(gain(&profiles, "B"), 6.0);
    }

    #[test]
    fn test_negligible_gain_is_zero() {
        let profiles = compensate(
            &report(&[("A", -20.3), ("B", -20.0), ("C", -21.26)]),
            &LoudnessPolicy::default(),
        );
        assert_eq!(gain(&profiles, "A"), 0.0);
        assert_eq!(gain(&profiles, "B"), 0.0);
        assert_eq!(gain(&profiles, "C"), 1.26);
        assert_eq!(profiles[0].measured_loudness_db, -20.3);
    }

    #[test]
    fn test_empty_report() {
        assert!(compensate(&LoudnessReport::default(), &LoudnessPolicy::default()).is_empty());
    }

    #[test]
    fn test_assign_and_apply() {
        let events: Vec<WordEvent> = [("Ana", 0.0, 4.0), ("Ben", 4.0, 10.0)]
            .iter()
            .map(|(s, start, end)| WordEvent {
                start: Some(*start),
                end: Some(*end),
                speaker: Some(s.to_string()),
                ..Default::default()
            })
            .collect();
        let timeline = SpeakerTimeline::from_events(&events, 1.0);
        let segments = vec![
            KeepSegment::new(0.0, 3.0),
            KeepSegment::new(3.5, 9.0),
            KeepSegment::new(11.0, 12.0),
        ];
        let profiles = compensate(&report(&[("Ana", -12.0), ("Ben", -15.0)]), &LoudnessPolicy::default());

        let segments = apply_gains(assign_speakers(segments, &timeline), &profiles);

        assert_eq!(segments[0].speaker_id(), Some("Ana"));
        assert_eq!(segments[0].gain_db(), 0.0);
        assert_eq!(segments[1].speaker_id(), Some("Ben"));
        assert_eq!(segments[1].gain_db(), 3.0);
        assert_eq!(segments[2].speaker_id(), None);
        assert_eq!(segments[2].gain_db(), 0.0);
        assert_eq!(segments[1].start(), 3.5);
    }
}
