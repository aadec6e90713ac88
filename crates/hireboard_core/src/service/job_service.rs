//! Job form use-cases.
//!
//! # Responsibility
//! - Create, edit, archive and restore job postings through the remote.
//! - Serve paginated job lists.
//!
//! # Invariants
//! - Archive and restore only touch `status`; rank and slug are unchanged.
//! - Validation failures are returned before any latency is paid.

use crate::model::job::{Job, JobDraft, JobId, JobPatch, JobStatus};
use crate::query::{JobQuery, Page};
use crate::remote::{RemoteResult, SimulatedRemote};
use crate::repo::kv::KvStore;
use std::sync::Arc;

pub struct JobService<S: KvStore> {
    remote: Arc<SimulatedRemote<S>>,
}

impl<S: KvStore> JobService<S> {
    pub fn new(remote: Arc<SimulatedRemote<S>>) -> Self {
        Self { remote }
    }

    pub async fn create_job(&self, draft: JobDraft) -> RemoteResult<Job> {
        self.remote.create_job(draft).await
    }

    pub async fn update_job(&self, id: JobId, patch: JobPatch) -> RemoteResult<Job> {
        self.remote.update_job(id, patch).await
    }

    pub async fn archive_job(&self, id: JobId) -> RemoteResult<Job> {
        self.set_status(id, JobStatus::Archived).await
    }

    pub async fn restore_job(&self, id: JobId) -> RemoteResult<Job> {
        self.set_status(id, JobStatus::Active).await
    }

    pub async fn list_jobs(&self, query: &JobQuery) -> RemoteResult<Page<Job>> {
        self.remote.list_jobs(query).await
    }

    pub async fn get_job(&self, id: JobId) -> RemoteResult<Job> {
        self.remote.get_job(id).await
    }

    /// Looks a job up by its slug; `None` when no job carries it.
    pub async fn job_by_slug(&self, slug: &str) -> RemoteResult<Option<Job>> {
        let jobs = self.remote.all_jobs().await?;
        Ok(jobs.into_iter().find(|job| job.slug == slug))
    }

    async fn set_status(&self, id: JobId, status: JobStatus) -> RemoteResult<Job> {
        let patch = JobPatch {
            status: Some(status),
            ..JobPatch::default()
        };
        self.remote.update_job(id, patch).await
    }
}
