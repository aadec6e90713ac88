//! `SimulatedRemote`: latency + fault injection in front of a `KvStore`.

use super::fault::{FaultPolicy, RandomFaults};
use super::latency::LatencyPolicy;
use super::reorder::shift_orders;
use super::{RemoteError, RemoteResult};
use crate::config::RemoteConfig;
use crate::model::assessment::Assessment;
use crate::model::candidate::{Candidate, CandidateDraft, CandidateId, CandidatePatch};
use crate::model::job::{Job, JobDraft, JobId, JobPatch};
use crate::model::now_epoch_ms;
use crate::model::timeline::{sort_newest_first, TimelineEvent};
use crate::model::validation::ValidationError;
use crate::query::{query_candidates, query_jobs, CandidateQuery, JobQuery, Page};
use crate::repo::kv::{Collection, KvStore};
use crate::repo::records::{load, load_all, save, save_all, WriteBatch};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Stand-in for a network API with randomized latency and failures.
pub struct SimulatedRemote<S: KvStore> {
    store: Arc<S>,
    faults: Arc<dyn FaultPolicy>,
    latency: LatencyPolicy,
    /// Held from the post-gate re-read to the write of a job mutation.
    job_writes: Mutex<()>,
    candidate_writes: Mutex<()>,
}

impl<S: KvStore> SimulatedRemote<S> {
    /// Default policy: 200..1200 ms latency, 8% failure on mutations.
    pub fn new(store: Arc<S>) -> Self {
        Self::from_config(store, &RemoteConfig::default())
    }

    pub fn from_config(store: Arc<S>, config: &RemoteConfig) -> Self {
        let faults: Arc<dyn FaultPolicy> = match config.seed {
            Some(seed) => Arc::new(RandomFaults::seeded(config.failure_rate, seed)),
            None => Arc::new(RandomFaults::new(config.failure_rate)),
        };
        Self {
            store,
            faults,
            latency: LatencyPolicy::uniform(config.latency_min_ms, config.latency_max_ms),
            job_writes: Mutex::new(()),
            candidate_writes: Mutex::new(()),
        }
    }

    pub fn with_faults(mut self, faults: impl FaultPolicy + 'static) -> Self {
        self.faults = Arc::new(faults);
        self
    }

    pub fn with_shared_faults(mut self, faults: Arc<dyn FaultPolicy>) -> Self {
        self.faults = faults;
        self
    }

    pub fn with_latency(mut self, latency: LatencyPolicy) -> Self {
        self.latency = latency;
        self
    }

    /// Direct store handle, bypassing latency and faults.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ---- jobs ----

    pub async fn list_jobs(&self, query: &JobQuery) -> RemoteResult<Page<Job>> {
        let latency = self.read_delay().await;
        let jobs = load_all::<Job, _>(&*self.store).await?;
        let page = query_jobs(&jobs, query);
        log_read("list_jobs", latency, page.items.len());
        Ok(page)
    }

    /// Every job, ordered by board rank.
    pub async fn all_jobs(&self) -> RemoteResult<Vec<Job>> {
        let latency = self.read_delay().await;
        let jobs = self.ranked_jobs().await?;
        log_read("all_jobs", latency, jobs.len());
        Ok(jobs)
    }

    pub async fn get_job(&self, id: JobId) -> RemoteResult<Job> {
        let latency = self.read_delay().await;
        let job = load::<Job, _>(&*self.store, &id.to_string())
            .await?
            .ok_or_else(|| RemoteError::not_found(Collection::Jobs, id))?;
        log_read("get_job", latency, 1);
        Ok(job)
    }

    /// Appends a job at the bottom of the board.
    ///
    /// Slug and rank are checked up front for fast form errors, then again
    /// under the job write lock, since other writes may land during the delay.
    pub async fn create_job(&self, draft: JobDraft) -> RemoteResult<Job> {
        let jobs = load_all::<Job, _>(&*self.store).await?;
        let mut job = Job::from_draft(draft, jobs.len() as i64);
        job.validate()?;
        ensure_unique_slug(&jobs, &job)?;

        let latency = self.mutation_gate("create_job").await?;
        let _writes = self.job_writes.lock().await;
        let jobs = load_all::<Job, _>(&*self.store).await?;
        ensure_unique_slug(&jobs, &job)?;
        job.order = jobs.len() as i64;
        save(&*self.store, &job).await?;
        log_write("create_job", latency);
        Ok(job)
    }

    /// Applies `patch` to the job as stored at write time; `order` is never
    /// taken from the pre-delay read.
    pub async fn update_job(&self, id: JobId, patch: JobPatch) -> RemoteResult<Job> {
        let jobs = load_all::<Job, _>(&*self.store).await?;
        patched_job(&jobs, id, patch.clone())?;

        let latency = self.mutation_gate("update_job").await?;
        let _writes = self.job_writes.lock().await;
        let jobs = load_all::<Job, _>(&*self.store).await?;
        let job = patched_job(&jobs, id, patch)?;
        save(&*self.store, &job).await?;
        log_write("update_job", latency);
        Ok(job)
    }

    /// Moves a job between board ranks, shifting everything in between.
    ///
    /// The shift is computed in memory and persisted as one atomic batch,
    /// after the fault gate. Returns the full ranking.
    pub async fn reorder_job(&self, id: JobId, from: i64, to: i64) -> RemoteResult<Vec<Job>> {
        let latency = self.mutation_gate("reorder_job").await?;
        let _writes = self.job_writes.lock().await;

        let mut jobs = load_all::<Job, _>(&*self.store).await?;
        let changed = shift_orders(&mut jobs, id, from, to)?;
        if !changed.is_empty() {
            let touched: Vec<Job> = changed.iter().map(|index| jobs[*index].clone()).collect();
            save_all(&*self.store, &touched).await?;
        }
        info!(
            "event=remote_call module=remote op=reorder_job status=ok latency_ms={} from={from} to={to} shifted={}",
            latency.as_millis(),
            changed.len()
        );

        jobs.sort_by(|left, right| left.order.cmp(&right.order).then(left.id.cmp(&right.id)));
        Ok(jobs)
    }

    // ---- candidates ----

    pub async fn list_candidates(&self, query: &CandidateQuery) -> RemoteResult<Page<Candidate>> {
        let latency = self.read_delay().await;
        let candidates = load_all::<Candidate, _>(&*self.store).await?;
        let page = query_candidates(&candidates, query);
        log_read("list_candidates", latency, page.items.len());
        Ok(page)
    }

    pub async fn all_candidates(&self) -> RemoteResult<Vec<Candidate>> {
        let latency = self.read_delay().await;
        let candidates = load_all::<Candidate, _>(&*self.store).await?;
        log_read("all_candidates", latency, candidates.len());
        Ok(candidates)
    }

    pub async fn get_candidate(&self, id: CandidateId) -> RemoteResult<Candidate> {
        let latency = self.read_delay().await;
        let candidate = self.load_candidate(id).await?;
        log_read("get_candidate", latency, 1);
        Ok(candidate)
    }

    /// Creates a candidate in `applied` and records the application event.
    pub async fn create_candidate(&self, draft: CandidateDraft) -> RemoteResult<Candidate> {
        let candidate = Candidate::from_draft(draft);
        candidate.validate()?;
        self.ensure_job_exists(candidate.job_id).await?;

        let latency = self.mutation_gate("create_candidate").await?;
        let event = TimelineEvent::stage_change(
            candidate.id,
            candidate.stage,
            Some("Application received".to_string()),
        );
        WriteBatch::new()
            .put(&candidate)?
            .put(&event)?
            .commit(&*self.store)
            .await?;
        log_write("create_candidate", latency);
        Ok(candidate)
    }

    /// Updates a candidate; a real stage change appends one timeline event.
    ///
    /// The candidate and its event are written as one batch, against the
    /// record as stored after the delay.
    pub async fn update_candidate(
        &self,
        id: CandidateId,
        patch: CandidatePatch,
    ) -> RemoteResult<Candidate> {
        let mut preview = self.load_candidate(id).await?;
        preview.apply_patch(&patch);
        preview.validate()?;

        let latency = self.mutation_gate("update_candidate").await?;
        let _writes = self.candidate_writes.lock().await;
        let mut candidate = self.load_candidate(id).await?;
        let previous_stage = candidate.stage;
        candidate.apply_patch(&patch);
        candidate.validate()?;

        let mut batch = WriteBatch::new().put(&candidate)?;
        let stage_changed = candidate.stage != previous_stage;
        if stage_changed {
            let event =
                TimelineEvent::stage_change(candidate.id, candidate.stage, patch.transition_note);
            batch = batch.put(&event)?;
        }
        batch.commit(&*self.store).await?;
        info!(
            "event=remote_call module=remote op=update_candidate status=ok latency_ms={} stage_changed={stage_changed}",
            latency.as_millis()
        );
        Ok(candidate)
    }

    /// Timeline for one candidate, newest first.
    pub async fn candidate_timeline(&self, id: CandidateId) -> RemoteResult<Vec<TimelineEvent>> {
        let latency = self.read_delay().await;
        let mut events: Vec<TimelineEvent> = load_all::<TimelineEvent, _>(&*self.store)
            .await?
            .into_iter()
            .filter(|event| event.candidate_id == id)
            .collect();
        sort_newest_first(&mut events);
        log_read("candidate_timeline", latency, events.len());
        Ok(events)
    }

    /// Appends a free-form note at the candidate's current stage.
    pub async fn add_candidate_note(
        &self,
        id: CandidateId,
        note: &str,
    ) -> RemoteResult<TimelineEvent> {
        if note.trim().is_empty() {
            return Err(ValidationError::EmptyNote.into());
        }
        self.load_candidate(id).await?;

        let latency = self.mutation_gate("add_candidate_note").await?;
        let _writes = self.candidate_writes.lock().await;
        let candidate = self.load_candidate(id).await?;
        let event = TimelineEvent::note(candidate.id, candidate.stage, note.trim());
        save(&*self.store, &event).await?;
        log_write("add_candidate_note", latency);
        Ok(event)
    }

    // ---- assessments ----

    pub async fn get_assessment(&self, job_id: JobId) -> RemoteResult<Option<Assessment>> {
        let latency = self.read_delay().await;
        let assessment = load::<Assessment, _>(&*self.store, &job_id.to_string()).await?;
        log_read("get_assessment", latency, usize::from(assessment.is_some()));
        Ok(assessment)
    }

    pub async fn save_assessment(&self, assessment: Assessment) -> RemoteResult<Assessment> {
        assessment.validate()?;
        self.ensure_job_exists(assessment.job_id).await?;

        let latency = self.mutation_gate("save_assessment").await?;
        let mut saved = assessment;
        saved.updated_at = now_epoch_ms();
        save(&*self.store, &saved).await?;
        log_write("save_assessment", latency);
        Ok(saved)
    }

    // ---- internals ----

    async fn read_delay(&self) -> Duration {
        let delay = self.latency.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Latency, then the fault decision. Runs before any store write.
    async fn mutation_gate(&self, op: &'static str) -> RemoteResult<Duration> {
        let delay = self.read_delay().await;
        if self.faults.should_fail() {
            warn!(
                "event=remote_call module=remote op={op} status=failed latency_ms={} error_code=injected_fault",
                delay.as_millis()
            );
            return Err(RemoteError::Transient { op });
        }
        Ok(delay)
    }

    async fn ranked_jobs(&self) -> RemoteResult<Vec<Job>> {
        let mut jobs = load_all::<Job, _>(&*self.store).await?;
        jobs.sort_by(|left, right| left.order.cmp(&right.order).then(left.id.cmp(&right.id)));
        Ok(jobs)
    }

    async fn load_candidate(&self, id: CandidateId) -> RemoteResult<Candidate> {
        load::<Candidate, _>(&*self.store, &id.to_string())
            .await?
            .ok_or_else(|| RemoteError::not_found(Collection::Candidates, id))
    }

    async fn ensure_job_exists(&self, job_id: JobId) -> RemoteResult<()> {
        match load::<Job, _>(&*self.store, &job_id.to_string()).await? {
            Some(_) => Ok(()),
            None => Err(ValidationError::UnknownJob(job_id).into()),
        }
    }
}

/// Copy of job `id` from `jobs` with `patch` applied and validated.
fn patched_job(jobs: &[Job], id: JobId, patch: JobPatch) -> RemoteResult<Job> {
    let mut job = jobs
        .iter()
        .find(|job| job.id == id)
        .cloned()
        .ok_or_else(|| RemoteError::not_found(Collection::Jobs, id))?;
    job.apply_patch(patch);
    job.validate()?;
    ensure_unique_slug(jobs, &job)?;
    Ok(job)
}

fn ensure_unique_slug(jobs: &[Job], job: &Job) -> Result<(), ValidationError> {
    if jobs
        .iter()
        .any(|other| other.id != job.id && other.slug == job.slug)
    {
        return Err(ValidationError::DuplicateSlug(job.slug.clone()));
    }
    Ok(())
}

fn log_read(op: &str, latency: Duration, count: usize) {
    debug!(
        "event=remote_call module=remote op={op} status=ok latency_ms={} count={count}",
        latency.as_millis()
    );
}

fn log_write(op: &str, latency: Duration) {
    info!(
        "event=remote_call module=remote op={op} status=ok latency_ms={}",
        latency.as_millis()
    );
}
