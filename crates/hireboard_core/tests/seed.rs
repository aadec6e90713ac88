use hireboard_core::repo::records::load_all;
use hireboard_core::{
    seed, Assessment, Candidate, Job, JobStatus, SeedOptions, SqliteKvStore, Stage, TimelineEvent,
};
use std::collections::HashSet;

#[tokio::test]
async fn default_seed_fills_every_collection() {
    let store = SqliteKvStore::open_in_memory().unwrap();

    let report = seed(&store, SeedOptions::default()).await.unwrap();
    assert_eq!(report.jobs, 25);
    assert_eq!(report.candidates, 1000);
    assert_eq!(report.assessments, 3);

    let mut jobs: Vec<Job> = load_all(&store).await.unwrap();
    jobs.sort_by_key(|job| job.order);
    assert_eq!(
        jobs.iter().map(|job| job.order).collect::<Vec<_>>(),
        (0..25).collect::<Vec<_>>()
    );

    let candidates: Vec<Candidate> = load_all(&store).await.unwrap();
    let job_ids: HashSet<_> = jobs.iter().map(|job| job.id).collect();
    assert!(candidates
        .iter()
        .all(|candidate| job_ids.contains(&candidate.job_id)));
    assert!(candidates.iter().all(|candidate| candidate.validate().is_ok()));

    let events: Vec<TimelineEvent> = load_all(&store).await.unwrap();
    assert_eq!(events.len(), report.timeline_events);
    let with_events: HashSet<_> = events.iter().map(|event| event.candidate_id).collect();
    assert_eq!(with_events.len(), candidates.len());
    for candidate in candidates.iter().filter(|candidate| candidate.stage != Stage::Applied) {
        assert!(events
            .iter()
            .any(|event| event.candidate_id == candidate.id && event.stage == candidate.stage));
    }

    let assessments: Vec<Assessment> = load_all(&store).await.unwrap();
    assert_eq!(assessments.len(), 3);
    for assessment in &assessments {
        assert!(assessment.question_count() >= 10);
        assert!(assessment.validate().is_ok());
        assert!(job_ids.contains(&assessment.job_id));
    }
}

#[tokio::test]
async fn reseeding_replaces_previous_data() {
    let store = SqliteKvStore::open_in_memory().unwrap();
    let options = SeedOptions {
        jobs: 60,
        candidates: 40,
        assessments: 1,
        seed: 7,
    };
    seed(&store, options).await.unwrap();
    let first: Vec<Job> = load_all(&store).await.unwrap();

    seed(&store, options).await.unwrap();
    let second: Vec<Job> = load_all(&store).await.unwrap();
    let candidates: Vec<Candidate> = load_all(&store).await.unwrap();

    assert_eq!(second.len(), 60);
    assert_eq!(candidates.len(), 40);
    let first_ids: Vec<_> = first.iter().map(|job| (job.id, job.slug.clone())).collect();
    let second_ids: Vec<_> = second.iter().map(|job| (job.id, job.slug.clone())).collect();
    assert_eq!(first_ids, second_ids);

    let statuses: HashSet<JobStatus> = second.iter().map(|job| job.status).collect();
    assert_eq!(statuses.len(), 2, "expected both active and archived jobs");
}

#[tokio::test]
async fn seeding_without_jobs_writes_no_candidates() {
    let store = SqliteKvStore::open_in_memory().unwrap();
    let report = seed(
        &store,
        SeedOptions {
            jobs: 0,
            candidates: 10,
            assessments: 3,
            seed: 1,
        },
    )
    .await
    .unwrap();
    assert_eq!(report, hireboard_core::SeedReport::default());
}
