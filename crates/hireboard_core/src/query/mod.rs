//! Read-side filtering and pagination.
//!
//! # Invariants
//! - Pure and deterministic: same collection and parameters, same page.
//! - Pages are 1-based; page size is clamped to `[1, MAX_PAGE_SIZE]`.
//! - Jobs are ordered by board rank, candidates by insertion order.

use crate::model::candidate::{Candidate, Stage};
use crate::model::job::{Job, JobId, JobStatus};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// One slice of a filtered collection plus totals for pagers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: usize,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    /// Case-insensitive substring over the title.
    pub search: Option<String>,
    pub status: Option<JobStatus>,
    /// Exact tag membership.
    pub tag: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            tag: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuery {
    /// Case-insensitive substring over name or email.
    pub search: Option<String>,
    pub stage: Option<Stage>,
    pub job_id: Option<JobId>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for CandidateQuery {
    fn default() -> Self {
        Self {
            search: None,
            stage: None,
            job_id: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Filters, orders by `order` (ties by id) and pages the job collection.
pub fn query_jobs(jobs: &[Job], query: &JobQuery) -> Page<Job> {
    let needle = normalize_search(query.search.as_deref());
    let tag = query
        .tag
        .as_deref()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty());

    let mut matched: Vec<&Job> = jobs
        .iter()
        .filter(|job| query.status.map_or(true, |status| job.status == status))
        .filter(|job| tag.as_ref().map_or(true, |tag| job.tags.contains(tag)))
        .filter(|job| {
            needle
                .as_ref()
                .map_or(true, |needle| job.title.to_lowercase().contains(needle))
        })
        .collect();
    matched.sort_by(|left, right| left.order.cmp(&right.order).then(left.id.cmp(&right.id)));

    paginate(matched.into_iter().cloned().collect(), query.page, query.page_size)
}

/// Filters and pages candidates, keeping the store's insertion order.
pub fn query_candidates(candidates: &[Candidate], query: &CandidateQuery) -> Page<Candidate> {
    let needle = normalize_search(query.search.as_deref());

    let matched: Vec<Candidate> = candidates
        .iter()
        .filter(|candidate| query.stage.map_or(true, |stage| candidate.stage == stage))
        .filter(|candidate| query.job_id.map_or(true, |job_id| candidate.job_id == job_id))
        .filter(|candidate| {
            needle.as_ref().map_or(true, |needle| {
                candidate.name.to_lowercase().contains(needle)
                    || candidate.email.to_lowercase().contains(needle)
            })
        })
        .cloned()
        .collect();

    paginate(matched, query.page, query.page_size)
}

/// Slices already-ordered items into one page.
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: u32) -> Page<T> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size as usize) as u32;
    let start = (page as usize - 1).saturating_mul(page_size as usize);

    let items = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    Page {
        items,
        page,
        page_size,
        total,
        total_pages,
    }
}

fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{paginate, query_candidates, query_jobs, CandidateQuery, JobQuery};
    use crate::model::candidate::{Candidate, CandidateDraft, Stage};
    use crate::model::job::{Job, JobDraft, JobStatus};
    use uuid::Uuid;

    fn job(title: &str, order: i64, status: JobStatus, tags: &[&str]) -> Job {
        let mut draft = JobDraft::new(title).with_tags(tags.iter().copied());
        draft.status = status;
        Job::from_draft(draft, order)
    }

    fn candidate(name: &str, email: &str, job_id: Uuid, stage: Stage) -> Candidate {
        let mut candidate = Candidate::from_draft(CandidateDraft {
            name: name.to_string(),
            email: email.to_string(),
            job_id,
            notes: String::new(),
        });
        candidate.stage = stage;
        candidate
    }

    #[test]
    fn paginate_reports_totals_and_clamps() {
        let page = paginate((0..25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());

        let past_end = paginate((0..5).collect::<Vec<_>>(), 9, 2);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 3);

        let clamped = paginate((0..5).collect::<Vec<_>>(), 0, 0);
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.page_size, 1);
        assert_eq!(clamped.items, vec![0]);
    }

    #[test]
    fn query_jobs_filters_and_orders_by_rank() {
        let jobs = vec![
            job("Backend Engineer", 2, JobStatus::Active, &["rust"]),
            job("Frontend Engineer", 0, JobStatus::Active, &["ts"]),
            job("Platform engineer", 1, JobStatus::Archived, &["rust"]),
            job("Recruiter", 3, JobStatus::Active, &[]),
        ];

        let all = query_jobs(&jobs, &JobQuery::default());
        let titles: Vec<_> = all.items.iter().map(|job| job.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Frontend Engineer", "Platform engineer", "Backend Engineer", "Recruiter"]
        );

        let filtered = query_jobs(
            &jobs,
            &JobQuery {
                search: Some("ENGINEER".to_string()),
                tag: Some("Rust".to_string()),
                status: Some(JobStatus::Active),
                ..JobQuery::default()
            },
        );
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.items[0].title, "Backend Engineer");
    }

    #[test]
    fn query_candidates_keeps_insertion_order() {
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();
        let candidates = vec![
            candidate("Zed", "zed@corp.io", job_a, Stage::Screen),
            candidate("Amy", "amy@mail.io", job_b, Stage::Screen),
            candidate("Bob", "bob@corp.io", job_a, Stage::Applied),
        ];

        let screen = query_candidates(
            &candidates,
            &CandidateQuery {
                stage: Some(Stage::Screen),
                ..CandidateQuery::default()
            },
        );
        let names: Vec<_> = screen.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Amy"]);

        let by_email = query_candidates(
            &candidates,
            &CandidateQuery {
                search: Some("CORP".to_string()),
                job_id: Some(job_a),
                ..CandidateQuery::default()
            },
        );
        assert_eq!(by_email.total, 2);
    }
}
