//! Append-only candidate timeline.

use super::candidate::{CandidateId, Stage};
use super::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TimelineEventId = Uuid;

/// Distinguishes system-written stage changes from user notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    StageChange,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: TimelineEventId,
    pub candidate_id: CandidateId,
    pub stage: Stage,
    pub timestamp: i64,
    pub note: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TimelineEventKind>,
}

impl TimelineEvent {
    /// Stage-change entry; the note defaults to `Moved to <stage>`.
    pub fn stage_change(candidate_id: CandidateId, stage: Stage, note: Option<String>) -> Self {
        let note = note
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("Moved to {stage}"));
        Self::new(candidate_id, stage, note, TimelineEventKind::StageChange)
    }

    pub fn note(candidate_id: CandidateId, stage: Stage, note: impl Into<String>) -> Self {
        Self::new(candidate_id, stage, note.into(), TimelineEventKind::Note)
    }

    fn new(candidate_id: CandidateId, stage: Stage, note: String, kind: TimelineEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            stage,
            timestamp: now_epoch_ms(),
            note,
            kind: Some(kind),
        }
    }
}

/// Orders one candidate's events newest first.
///
/// Events sharing a timestamp keep reverse insertion order, so the latest
/// write still shows on top.
pub fn sort_newest_first(events: &mut Vec<TimelineEvent>) {
    events.reverse();
    events.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
}

#[cfg(test)]
mod tests {
    use super::{sort_newest_first, TimelineEvent, TimelineEventKind};
    use crate::model::candidate::Stage;
    use uuid::Uuid;

    #[test]
    fn stage_change_uses_default_note() {
        let event = TimelineEvent::stage_change(Uuid::new_v4(), Stage::Screen, None);
        assert_eq!(event.note, "Moved to screen");
        assert_eq!(event.kind, Some(TimelineEventKind::StageChange));

        let blank = TimelineEvent::stage_change(Uuid::new_v4(), Stage::Offer, Some("  ".into()));
        assert_eq!(blank.note, "Moved to offer");
    }

    #[test]
    fn legacy_events_without_type_tag_still_parse() {
        let candidate_id = Uuid::new_v4();
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "candidateId": candidate_id,
            "stage": "tech",
            "timestamp": 10,
            "note": "call went well",
        });
        let event: TimelineEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.kind, None);
        assert_eq!(event.candidate_id, candidate_id);
    }

    #[test]
    fn sort_newest_first_breaks_ties_by_latest_insert() {
        let candidate_id = Uuid::new_v4();
        let mut first = TimelineEvent::note(candidate_id, Stage::Applied, "first");
        let mut second = TimelineEvent::note(candidate_id, Stage::Applied, "second");
        let mut older = TimelineEvent::note(candidate_id, Stage::Applied, "older");
        first.timestamp = 20;
        second.timestamp = 20;
        older.timestamp = 5;

        let mut events = vec![older, first, second];
        sort_newest_first(&mut events);
        let notes: Vec<_> = events.iter().map(|event| event.note.as_str()).collect();
        assert_eq!(notes, vec!["second", "first", "older"]);
    }
}
