//! Optimistic mutation coordinator.
//!
//! # Responsibility
//! - Own the displayed board state (jobs by rank, candidates by insertion).
//! - Apply reorders and stage moves locally first, then confirm remotely.
//! - Run job form writes behind the same writer as reorders.
//! - On remote failure, discard the optimistic state and reload from the store.
//!
//! # Invariants
//! - State transitions are synchronous; the state lock is never held across `.await`.
//! - Mutations on one collection are serialized behind a single writer.
//! - After a rollback the displayed collection equals the stored collection.

use super::CoordinatorError;
use crate::model::candidate::{Candidate, CandidateId, CandidatePatch, Stage};
use crate::model::job::{Job, JobDraft, JobId, JobPatch};
use crate::remote::{RemoteError, SimulatedRemote};
use crate::repo::kv::KvStore;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Displayed board state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    /// Every job, in board order.
    pub jobs: Vec<Job>,
    /// Every candidate, in insertion order.
    pub candidates: Vec<Candidate>,
}

/// How a mutation attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Remote confirmed; the optimistic state stands.
    Committed,
    /// Remote failed; state was reloaded from the store.
    RolledBack { reason: String },
    /// Nothing to do (same position or same stage).
    Unchanged,
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Moves the item at `from` to `to` and renumbers ranks densely.
pub fn apply_reorder(jobs: &mut Vec<Job>, from: usize, to: usize) {
    if from == to || from >= jobs.len() || to >= jobs.len() {
        return;
    }
    let moving = jobs.remove(from);
    jobs.insert(to, moving);
    for (index, job) in jobs.iter_mut().enumerate() {
        job.order = index as i64;
    }
}

/// Sets a candidate's stage, returning the previous one.
pub fn apply_stage(candidates: &mut [Candidate], id: CandidateId, stage: Stage) -> Option<Stage> {
    let candidate = candidates.iter_mut().find(|candidate| candidate.id == id)?;
    Some(std::mem::replace(&mut candidate.stage, stage))
}

/// Owns the displayed [`BoardState`] and pushes every job and candidate
/// mutation through one writer per collection.
///
/// Reorders and stage moves are applied optimistically and reloaded from the
/// store if the remote rejects them. Job creates and edits are not shown until
/// the remote confirms them, but queue behind the same job writer so they
/// never interleave with a reorder.
pub struct MutationCoordinator<S: KvStore> {
    remote: Arc<SimulatedRemote<S>>,
    state: Mutex<BoardState>,
    job_writer: tokio::sync::Mutex<()>,
    candidate_writer: tokio::sync::Mutex<()>,
}

impl<S: KvStore> MutationCoordinator<S> {
    /// Creates a coordinator with empty state; call [`Self::load`] before use.
    pub fn new(remote: Arc<SimulatedRemote<S>>) -> Self {
        Self {
            remote,
            state: Mutex::new(BoardState::default()),
            job_writer: tokio::sync::Mutex::new(()),
            candidate_writer: tokio::sync::Mutex::new(()),
        }
    }

    pub fn remote(&self) -> &Arc<SimulatedRemote<S>> {
        &self.remote
    }

    /// Replaces displayed state with the authoritative collections.
    pub async fn load(&self) -> Result<(), CoordinatorError> {
        let _jobs = self.job_writer.lock().await;
        let _candidates = self.candidate_writer.lock().await;
        let jobs = self.remote.all_jobs().await.map_err(CoordinatorError::Reload)?;
        let candidates = self
            .remote
            .all_candidates()
            .await
            .map_err(CoordinatorError::Reload)?;
        let mut state = self.state();
        state.jobs = jobs;
        state.candidates = candidates;
        Ok(())
    }

    pub fn snapshot(&self) -> BoardState {
        self.state().clone()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.state().jobs.clone()
    }

    /// Board columns in stage order; every stage is present, possibly empty.
    pub fn candidates_by_stage(&self) -> BTreeMap<Stage, Vec<Candidate>> {
        let state = self.state();
        let mut columns: BTreeMap<Stage, Vec<Candidate>> =
            Stage::ALL.into_iter().map(|stage| (stage, Vec::new())).collect();
        for candidate in &state.candidates {
            columns
                .entry(candidate.stage)
                .or_default()
                .push(candidate.clone());
        }
        columns
    }

    /// Reorders a job: optimistic move, remote confirm, reload on failure.
    pub async fn reorder_job(
        &self,
        id: JobId,
        from: usize,
        to: usize,
    ) -> Result<MutationOutcome, CoordinatorError> {
        let _writer = self.job_writer.lock().await;

        {
            let mut state = self.state();
            let len = state.jobs.len();
            if from >= len || to >= len {
                return Err(CoordinatorError::OutOfRange { from, to, len });
            }
            let actual = state
                .jobs
                .iter()
                .position(|job| job.id == id)
                .ok_or(CoordinatorError::UnknownJob(id))?;
            if actual != from {
                return Err(CoordinatorError::StaleView {
                    job_id: id,
                    expected: from,
                    actual,
                });
            }
            if from == to {
                return Ok(MutationOutcome::Unchanged);
            }
            apply_reorder(&mut state.jobs, from, to);
        }

        match self.remote.reorder_job(id, from as i64, to as i64).await {
            Ok(_) => {
                info!(
                    "event=mutation module=coordinator op=reorder_job status=committed from={from} to={to}"
                );
                Ok(MutationOutcome::Committed)
            }
            Err(err) => {
                self.reload_jobs().await?;
                rollback_outcome("reorder_job", err)
            }
        }
    }

    /// Moves a candidate to `stage`: optimistic update, remote confirm, reload on failure.
    pub async fn move_candidate(
        &self,
        id: CandidateId,
        stage: Stage,
        note: Option<String>,
    ) -> Result<MutationOutcome, CoordinatorError> {
        let _writer = self.candidate_writer.lock().await;

        {
            let mut state = self.state();
            let current = state
                .candidates
                .iter()
                .find(|candidate| candidate.id == id)
                .map(|candidate| candidate.stage)
                .ok_or(CoordinatorError::UnknownCandidate(id))?;
            if current == stage {
                return Ok(MutationOutcome::Unchanged);
            }
            apply_stage(&mut state.candidates, id, stage);
        }

        let patch = CandidatePatch {
            stage: Some(stage),
            transition_note: note,
            ..CandidatePatch::default()
        };
        match self.remote.update_candidate(id, patch).await {
            Ok(_) => {
                info!(
                    "event=mutation module=coordinator op=move_candidate status=committed stage={stage}"
                );
                Ok(MutationOutcome::Committed)
            }
            Err(err) => {
                self.reload_candidates().await?;
                rollback_outcome("move_candidate", err)
            }
        }
    }

    /// Creates a job and shows it once the remote confirms it.
    pub async fn create_job(&self, draft: JobDraft) -> Result<Job, CoordinatorError> {
        let _writer = self.job_writer.lock().await;
        let job = self.remote.create_job(draft).await?;
        self.absorb_job(job.clone());
        info!(
            "event=mutation module=coordinator op=create_job status=committed order={}",
            job.order
        );
        Ok(job)
    }

    /// Edits a job's fields; its displayed rank is left to reorders.
    pub async fn update_job(&self, id: JobId, patch: JobPatch) -> Result<Job, CoordinatorError> {
        let _writer = self.job_writer.lock().await;
        let job = self.remote.update_job(id, patch).await?;
        self.absorb_job(job.clone());
        info!("event=mutation module=coordinator op=update_job status=committed");
        Ok(job)
    }

    /// Inserts or replaces a confirmed job, keeping board order.
    fn absorb_job(&self, job: Job) {
        let mut state = self.state();
        match state.jobs.iter_mut().find(|existing| existing.id == job.id) {
            Some(existing) => *existing = job,
            None => state.jobs.push(job),
        }
        state
            .jobs
            .sort_by(|left, right| left.order.cmp(&right.order).then(left.id.cmp(&right.id)));
    }

    async fn reload_jobs(&self) -> Result<(), CoordinatorError> {
        let jobs = self.remote.all_jobs().await.map_err(CoordinatorError::Reload)?;
        self.state().jobs = jobs;
        Ok(())
    }

    async fn reload_candidates(&self) -> Result<(), CoordinatorError> {
        let candidates = self
            .remote
            .all_candidates()
            .await
            .map_err(CoordinatorError::Reload)?;
        self.state().candidates = candidates;
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Transient failures become a rollback outcome; anything else is surfaced
/// after the same reload.
fn rollback_outcome(op: &str, err: RemoteError) -> Result<MutationOutcome, CoordinatorError> {
    warn!("event=mutation module=coordinator op={op} status=rolled_back error={err}");
    if err.is_transient() {
        Ok(MutationOutcome::RolledBack {
            reason: err.to_string(),
        })
    } else {
        Err(err.into())
    }
}
