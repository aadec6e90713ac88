//! Demo data generator.
//!
//! # Invariants
//! - All four collections are cleared before writing.
//! - Jobs receive dense orders `0..N-1`; slugs are unique.
//! - Every candidate starts with an `Application received` timeline entry.
//! - The same `seed` yields the same ids, names, stages and forms.
//!   Timestamps are relative to the current clock.

use crate::model::assessment::{Assessment, Question, QuestionKind, Section};
use crate::model::candidate::{Candidate, Stage};
use crate::model::job::{slugify, Job, JobStatus};
use crate::model::now_epoch_ms;
use crate::model::timeline::TimelineEvent;
use crate::repo::kv::{Collection, KvStore, StoreResult};
use crate::repo::records::save_all;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::time::Instant;
use uuid::{Builder, Uuid};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

const ROLES: &[&str] = &[
    "Backend Engineer",
    "Frontend Engineer",
    "Platform Engineer",
    "Data Engineer",
    "Product Designer",
    "Product Manager",
    "QA Engineer",
    "Site Reliability Engineer",
    "Security Engineer",
    "Mobile Engineer",
    "Engineering Manager",
    "Technical Writer",
];
const LEVELS: &[&str] = &["Junior", "Mid-level", "Senior", "Staff", "Principal"];
const TAGS: &[&str] = &[
    "remote", "onsite", "hybrid", "rust", "typescript", "react", "go", "python", "urgent",
    "contract",
];
const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Dennis", "Donald", "Edsger", "Frances", "Grace", "John",
    "Ken", "Leslie", "Linus", "Margaret", "Niklaus", "Radia", "Shafi", "Tim", "Whitfield",
    "Yukihiro",
];
const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Cerf", "Dijkstra", "Hamilton", "Hopper", "Kahn", "Knuth", "Lamport",
    "Liskov", "Lovelace", "McCarthy", "Perlman", "Ritchie", "Shannon", "Thompson", "Torvalds",
    "Turing", "Wirth", "Wozniak",
];
/// Weighted so most of the pipeline sits in early stages.
const STAGE_WEIGHTS: &[(Stage, u32)] = &[
    (Stage::Applied, 40),
    (Stage::Screen, 22),
    (Stage::Tech, 15),
    (Stage::Offer, 6),
    (Stage::Hired, 4),
    (Stage::Rejected, 13),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    pub jobs: usize,
    pub candidates: usize,
    /// Number of jobs (from the top of the board) that get an assessment.
    pub assessments: usize,
    pub seed: u64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            jobs: 25,
            candidates: 1000,
            assessments: 3,
            seed: 42,
        }
    }
}

/// Counts of what was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub jobs: usize,
    pub candidates: usize,
    pub assessments: usize,
    pub timeline_events: usize,
}

/// Replaces every collection in `store` with generated demo data.
pub async fn seed<S: KvStore + ?Sized>(store: &S, options: SeedOptions) -> StoreResult<SeedReport> {
    let started_at = Instant::now();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let now = now_epoch_ms();

    for collection in Collection::ALL {
        store.clear(collection).await?;
    }

    let jobs = generate_jobs(&mut rng, options.jobs, now);
    let candidates = if jobs.is_empty() {
        Vec::new()
    } else {
        generate_candidates(&mut rng, &jobs, options.candidates, now)
    };
    let events = generate_timeline(&mut rng, &candidates);
    let assessments: Vec<Assessment> = jobs
        .iter()
        .take(options.assessments)
        .map(|job| demo_assessment(job, now))
        .collect();

    save_all(store, &jobs).await?;
    save_all(store, &candidates).await?;
    save_all(store, &events).await?;
    save_all(store, &assessments).await?;

    let report = SeedReport {
        jobs: jobs.len(),
        candidates: candidates.len(),
        assessments: assessments.len(),
        timeline_events: events.len(),
    };
    info!(
        "event=seed module=seed status=ok jobs={} candidates={} assessments={} timeline_events={} duration_ms={}",
        report.jobs,
        report.candidates,
        report.assessments,
        report.timeline_events,
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

fn seeded_id(rng: &mut StdRng) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

fn generate_jobs(rng: &mut StdRng, count: usize, now: i64) -> Vec<Job> {
    let mut slugs = BTreeSet::new();
    (0..count)
        .map(|index| {
            let title = format!(
                "{} {}",
                LEVELS[index % LEVELS.len()],
                ROLES[(index / LEVELS.len() + index) % ROLES.len()]
            );
            let mut slug = slugify(&title);
            if !slugs.insert(slug.clone()) {
                slug = format!("{slug}-{index}");
                slugs.insert(slug.clone());
            }
            let tag_count = rng.gen_range(1..=3);
            let tags = TAGS
                .choose_multiple(rng, tag_count)
                .map(|tag| tag.to_string())
                .collect();
            let status = if rng.gen_bool(0.25) {
                JobStatus::Archived
            } else {
                JobStatus::Active
            };
            Job {
                id: seeded_id(rng),
                description: format!("We are hiring a {title} to join the team."),
                title,
                slug,
                status,
                tags,
                order: index as i64,
                created_at: now - rng.gen_range(0..90) * DAY_MS,
            }
        })
        .collect()
}

fn generate_candidates(rng: &mut StdRng, jobs: &[Job], count: usize, now: i64) -> Vec<Candidate> {
    (0..count)
        .map(|index| {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            let job = &jobs[rng.gen_range(0..jobs.len())];
            Candidate {
                id: seeded_id(rng),
                name: format!("{first} {last}"),
                email: format!(
                    "{}.{}{index}@example.com",
                    first.to_lowercase(),
                    last.to_lowercase()
                ),
                job_id: job.id,
                stage: pick_stage(rng),
                applied_at: now - rng.gen_range(1..60) * DAY_MS,
                notes: String::new(),
            }
        })
        .collect()
}

fn pick_stage(rng: &mut StdRng) -> Stage {
    let total: u32 = STAGE_WEIGHTS.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (stage, weight) in STAGE_WEIGHTS {
        if roll < *weight {
            return *stage;
        }
        roll -= weight;
    }
    Stage::Applied
}

/// One application entry per candidate, plus a stage-change entry for
/// candidates already past `applied`.
fn generate_timeline(rng: &mut StdRng, candidates: &[Candidate]) -> Vec<TimelineEvent> {
    let mut events = Vec::with_capacity(candidates.len() * 2);
    for candidate in candidates {
        let mut applied = TimelineEvent::stage_change(
            candidate.id,
            Stage::Applied,
            Some("Application received".to_string()),
        );
        applied.id = seeded_id(rng);
        applied.timestamp = candidate.applied_at;
        events.push(applied);

        if candidate.stage != Stage::Applied {
            let mut moved = TimelineEvent::stage_change(candidate.id, candidate.stage, None);
            moved.id = seeded_id(rng);
            moved.timestamp = candidate.applied_at + rng.gen_range(1..DAY_MS);
            events.push(moved);
        }
    }
    events
}

fn demo_assessment(job: &Job, now: i64) -> Assessment {
    let background = Section::new("background", "Background")
        .with_question(
            Question::new("years", QuestionKind::Number, "Years of professional experience")
                .required()
                .with_range(Some(0.0), Some(50.0)),
        )
        .with_question(
            Question::new("work-mode", QuestionKind::Single, "Preferred work mode")
                .required()
                .with_options(["remote", "hybrid", "onsite"]),
        )
        .with_question(
            Question::new("relocate", QuestionKind::Single, "Willing to relocate?")
                .with_options(["yes", "no"])
                .shown_when("work-mode", "onsite"),
        )
        .with_question(
            Question::new("city", QuestionKind::Short, "Preferred city")
                .with_max_length(80)
                .shown_when("relocate", "yes"),
        )
        .with_question(Question::new("resume", QuestionKind::File, "Upload your resume").required());

    let skills = Section::new("skills", "Skills")
        .with_question(
            Question::new("languages", QuestionKind::Multi, "Languages used in production")
                .required()
                .with_options(["rust", "go", "typescript", "python", "java"]),
        )
        .with_question(
            Question::new("rust-years", QuestionKind::Number, "Years writing Rust")
                .with_range(Some(0.0), Some(15.0))
                .shown_when("languages", "rust"),
        )
        .with_question(
            Question::new("testing", QuestionKind::Single, "How do you usually test?")
                .with_options(["unit", "integration", "property", "manual"]),
        )
        .with_question(
            Question::new("project", QuestionKind::Long, "Describe a project you are proud of")
                .required()
                .with_max_length(2000),
        );

    let logistics = Section::new("logistics", "Logistics")
        .with_question(
            Question::new("notice", QuestionKind::Number, "Notice period in weeks")
                .with_range(Some(0.0), Some(26.0)),
        )
        .with_question(
            Question::new("salary", QuestionKind::Short, "Salary expectation").with_max_length(40),
        )
        .with_question(
            Question::new("visa", QuestionKind::Single, "Do you need visa sponsorship?")
                .required()
                .with_options(["yes", "no"]),
        );

    let mut assessment = Assessment::empty(job.id)
        .with_section(background)
        .with_section(skills)
        .with_section(logistics);
    assessment.title = format!("{} assessment", job.title);
    assessment.updated_at = now;
    assessment
}

#[cfg(test)]
mod tests {
    use super::{demo_assessment, generate_jobs, pick_stage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn generated_jobs_have_dense_orders_and_unique_slugs() {
        let mut rng = StdRng::seed_from_u64(7);
        let jobs = generate_jobs(&mut rng, 60, 0);
        let orders: Vec<i64> = jobs.iter().map(|job| job.order).collect();
        assert_eq!(orders, (0..60).collect::<Vec<_>>());

        let slugs: HashSet<&str> = jobs.iter().map(|job| job.slug.as_str()).collect();
        assert_eq!(slugs.len(), jobs.len());
        assert!(jobs.iter().all(|job| job.validate().is_ok()));
    }

    #[test]
    fn demo_assessment_is_valid_and_large_enough() {
        let mut rng = StdRng::seed_from_u64(1);
        let jobs = generate_jobs(&mut rng, 1, 0);
        let assessment = demo_assessment(&jobs[0], 0);
        assert!(assessment.question_count() >= 10);
        assert!(assessment.validate().is_ok());
    }

    #[test]
    fn same_seed_picks_same_stages() {
        let mut left = StdRng::seed_from_u64(99);
        let mut right = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(pick_stage(&mut left), pick_stage(&mut right));
        }
    }
}
