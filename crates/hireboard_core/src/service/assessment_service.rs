//! Assessment builder and preview use-cases.
//!
//! # Responsibility
//! - Load and save the per-job assessment tree.
//! - Evaluate a candidate's answers against the stored tree for preview.
//!
//! # Invariants
//! - `load` never fails for a job that simply has no assessment yet.
//! - Visibility is single-level; see [`crate::assessment::is_visible`].

use crate::assessment::{validate_answers, visible_question_ids, AnswerError, Answers};
use crate::model::assessment::Assessment;
use crate::model::job::JobId;
use crate::remote::{RemoteResult, SimulatedRemote};
use crate::repo::kv::KvStore;
use std::sync::Arc;

/// Result of evaluating answers against an assessment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssessmentPreview {
    /// Ids of questions currently shown, in form order.
    pub visible: Vec<String>,
    /// Problems with the answers to visible questions.
    pub errors: Vec<AnswerError>,
}

impl AssessmentPreview {
    pub fn is_submittable(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct AssessmentService<S: KvStore> {
    remote: Arc<SimulatedRemote<S>>,
}

impl<S: KvStore> AssessmentService<S> {
    pub fn new(remote: Arc<SimulatedRemote<S>>) -> Self {
        Self { remote }
    }

    /// Returns the stored assessment, or an empty one for `job_id`.
    pub async fn load(&self, job_id: JobId) -> RemoteResult<Assessment> {
        let stored = self.remote.get_assessment(job_id).await?;
        Ok(stored.unwrap_or_else(|| Assessment::empty(job_id)))
    }

    pub async fn save(&self, assessment: Assessment) -> RemoteResult<Assessment> {
        assessment.validate()?;
        self.remote.save_assessment(assessment).await
    }

    pub async fn preview(&self, job_id: JobId, answers: &Answers) -> RemoteResult<AssessmentPreview> {
        let assessment = self.load(job_id).await?;
        Ok(preview_answers(&assessment, answers))
    }
}

/// Pure preview evaluation over an already-loaded tree.
pub fn preview_answers(assessment: &Assessment, answers: &Answers) -> AssessmentPreview {
    AssessmentPreview {
        visible: visible_question_ids(assessment, answers),
        errors: validate_answers(assessment, answers),
    }
}
