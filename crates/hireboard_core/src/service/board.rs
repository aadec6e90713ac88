//! Intent routing for the rendering layer.
//!
//! # Responsibility
//! - Accept user intents and route them to the coordinator or services.
//! - Job creates and edits go through the coordinator's job writer, so they
//!   queue with reorders instead of racing them.

use super::assessment_service::AssessmentService;
use super::coordinator::{MutationCoordinator, MutationOutcome};
use super::job_service::JobService;
use super::CoordinatorError;
use crate::model::assessment::Assessment;
use crate::model::candidate::{CandidateId, Stage};
use crate::model::job::{Job, JobDraft, JobId, JobPatch};
use crate::query::{paginate, Page};
use crate::remote::SimulatedRemote;
use crate::repo::kv::KvStore;
use log::info;
use std::sync::Arc;

/// User intent emitted by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardIntent {
    Reorder {
        job_id: JobId,
        from: usize,
        to: usize,
    },
    SetStage {
        candidate_id: CandidateId,
        stage: Stage,
        note: Option<String>,
    },
    SaveAssessment(Assessment),
    CreateJob(JobDraft),
    UpdateJob { id: JobId, patch: JobPatch },
}

impl BoardIntent {
    fn name(&self) -> &'static str {
        match self {
            Self::Reorder { .. } => "reorder",
            Self::SetStage { .. } => "set_stage",
            Self::SaveAssessment(_) => "save_assessment",
            Self::CreateJob(_) => "create_job",
            Self::UpdateJob { .. } => "update_job",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentResult {
    /// Reorder or stage move, with its reconciliation outcome.
    Mutation(MutationOutcome),
    Job(Job),
    Assessment(Assessment),
}

/// Facade bundling the coordinator and form services over one remote.
pub struct Board<S: KvStore> {
    coordinator: MutationCoordinator<S>,
    jobs: JobService<S>,
    assessments: AssessmentService<S>,
}

impl<S: KvStore> Board<S> {
    pub fn new(remote: Arc<SimulatedRemote<S>>) -> Self {
        Self {
            coordinator: MutationCoordinator::new(Arc::clone(&remote)),
            jobs: JobService::new(Arc::clone(&remote)),
            assessments: AssessmentService::new(remote),
        }
    }

    /// Builds a board and loads the authoritative state.
    pub async fn open(remote: Arc<SimulatedRemote<S>>) -> Result<Self, CoordinatorError> {
        let board = Self::new(remote);
        board.coordinator.load().await?;
        Ok(board)
    }

    pub fn coordinator(&self) -> &MutationCoordinator<S> {
        &self.coordinator
    }

    pub fn jobs(&self) -> &JobService<S> {
        &self.jobs
    }

    pub fn assessments(&self) -> &AssessmentService<S> {
        &self.assessments
    }

    /// Current job list slice plus pagination metadata, from displayed state.
    pub fn job_page(&self, page: u32, page_size: u32) -> Page<Job> {
        paginate(self.coordinator.jobs(), page, page_size)
    }

    pub async fn dispatch(&self, intent: BoardIntent) -> Result<IntentResult, CoordinatorError> {
        let name = intent.name();
        let result = match intent {
            BoardIntent::Reorder { job_id, from, to } => IntentResult::Mutation(
                self.coordinator.reorder_job(job_id, from, to).await?,
            ),
            BoardIntent::SetStage {
                candidate_id,
                stage,
                note,
            } => IntentResult::Mutation(
                self.coordinator
                    .move_candidate(candidate_id, stage, note)
                    .await?,
            ),
            BoardIntent::SaveAssessment(assessment) => {
                IntentResult::Assessment(self.assessments.save(assessment).await?)
            }
            BoardIntent::CreateJob(draft) => {
                IntentResult::Job(self.coordinator.create_job(draft).await?)
            }
            BoardIntent::UpdateJob { id, patch } => {
                IntentResult::Job(self.coordinator.update_job(id, patch).await?)
            }
        };
        info!("event=intent module=board intent={name} status=ok");
        Ok(result)
    }
}
