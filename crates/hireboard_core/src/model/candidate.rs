//! Candidate record and pipeline stages.
//!
//! # Invariants
//! - `job_id` is a soft reference: checked on create, not enforced by the store.

use super::job::JobId;
use super::now_epoch_ms;
use super::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub type CandidateId = Uuid;

/// Pipeline stage, declared in board column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Screen,
    Tech,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Screen,
        Stage::Tech,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Screen => "screen",
            Self::Tech => "tech",
            Self::Offer => "offer",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    /// Column heading used by board renderers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Screen => "Screening",
            Self::Tech => "Technical",
            Self::Offer => "Offer",
            Self::Hired => "Hired",
            Self::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub job_id: JobId,
    pub stage: Stage,
    pub applied_at: i64,
    #[serde(default)]
    pub notes: String,
}

impl Candidate {
    pub fn from_draft(draft: CandidateDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_lowercase(),
            job_id: draft.job_id,
            stage: Stage::Applied,
            applied_at: now_epoch_ms(),
            notes: draft.notes,
        }
    }

    /// Applies a partial edit in place; `transition_note` is left to the caller.
    pub fn apply_patch(&mut self, patch: &CandidatePatch) {
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = &patch.email {
            self.email = email.trim().to_lowercase();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
    }

    /// Checks name and email shape. Job existence needs the collection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDraft {
    pub name: String,
    pub email: String,
    pub job_id: JobId,
    pub notes: String,
}

/// Partial candidate edit. `transition_note` only matters when `stage` changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub stage: Option<Stage>,
    pub notes: Option<String>,
    pub transition_note: Option<String>,
}

impl CandidatePatch {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Candidate, CandidateDraft, CandidatePatch, Stage};
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    fn draft(name: &str, email: &str) -> CandidateDraft {
        CandidateDraft {
            name: name.to_string(),
            email: email.to_string(),
            job_id: Uuid::new_v4(),
            notes: String::new(),
        }
    }

    #[test]
    fn new_candidates_start_in_applied() {
        let candidate = Candidate::from_draft(draft("Ada", "Ada@Example.com"));
        assert_eq!(candidate.stage, Stage::Applied);
        assert_eq!(candidate.email, "ada@example.com");
        candidate.validate().unwrap();
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_email() {
        let blank = Candidate::from_draft(draft("  ", "a@b.io"));
        assert_eq!(blank.validate(), Err(ValidationError::MissingName));

        let bad = Candidate::from_draft(draft("Linus", "not-an-email"));
        assert!(matches!(bad.validate(), Err(ValidationError::InvalidEmail(_))));
    }

    #[test]
    fn apply_patch_touches_only_given_fields() {
        let mut candidate = Candidate::from_draft(draft("Ada", "ada@example.com"));
        let before = candidate.clone();

        candidate.apply_patch(&CandidatePatch {
            email: Some("  ADA@Analytical.org ".to_string()),
            stage: Some(Stage::Tech),
            transition_note: Some("ignored here".to_string()),
            ..CandidatePatch::default()
        });

        assert_eq!(candidate.email, "ada@analytical.org");
        assert_eq!(candidate.stage, Stage::Tech);
        assert_eq!(candidate.name, before.name);
        assert_eq!(candidate.notes, before.notes);
    }

    #[test]
    fn stage_parse_round_trips_board_order() {
        for stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("TECH"), Some(Stage::Tech));
        assert_eq!(Stage::parse("onsite"), None);
    }
}
