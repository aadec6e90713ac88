use hireboard_core::repo::kv::BatchEntry;
use hireboard_core::repo::records::{load, load_all, remove, save, save_all, WriteBatch};
use hireboard_core::{
    Candidate, CandidateDraft, Collection, Job, JobDraft, KvStore, MemoryKvStore, SqliteKvStore,
    Stage, StoreError, TimelineEvent,
};
use serde_json::json;

async fn exercise_basic_contract<S: KvStore>(store: &S) {
    assert!(store.get_all(Collection::Jobs).await.unwrap().is_empty());
    assert_eq!(store.get(Collection::Jobs, "missing").await.unwrap(), None);

    store
        .put(Collection::Jobs, "b", json!({ "n": 1 }))
        .await
        .unwrap();
    store
        .put(Collection::Jobs, "a", json!({ "n": 2 }))
        .await
        .unwrap();
    store
        .put(Collection::Jobs, "b", json!({ "n": 3 }))
        .await
        .unwrap();

    let keys: Vec<String> = store
        .get_all(Collection::Jobs)
        .await
        .unwrap()
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
    assert_eq!(
        store.get(Collection::Jobs, "b").await.unwrap(),
        Some(json!({ "n": 3 }))
    );

    // Collections are isolated.
    assert!(store.get_all(Collection::Candidates).await.unwrap().is_empty());

    assert!(store.delete(Collection::Jobs, "a").await.unwrap());
    assert!(!store.delete(Collection::Jobs, "a").await.unwrap());

    store.clear(Collection::Jobs).await.unwrap();
    assert!(store.get_all(Collection::Jobs).await.unwrap().is_empty());
}

async fn exercise_records<S: KvStore>(store: &S) {
    let jobs: Vec<Job> = ["Rust Engineer", "Designer", "Recruiter"]
        .iter()
        .enumerate()
        .map(|(index, title)| Job::from_draft(JobDraft::new(*title), index as i64))
        .collect();
    save_all(store, &jobs).await.unwrap();

    let loaded: Vec<Job> = load_all(store).await.unwrap();
    assert_eq!(loaded, jobs);

    let mut renamed = jobs[1].clone();
    renamed.title = "Product Designer".to_string();
    save(store, &renamed).await.unwrap();
    let fetched: Option<Job> = load(store, &renamed.id.to_string()).await.unwrap();
    assert_eq!(fetched, Some(renamed.clone()));

    assert!(remove::<Job, _>(store, &jobs[0].id.to_string()).await.unwrap());
    let remaining: Vec<Job> = load_all(store).await.unwrap();
    assert_eq!(remaining, vec![renamed, jobs[2].clone()]);
}

#[tokio::test]
async fn sqlite_store_honors_kv_contract() {
    let store = SqliteKvStore::open_in_memory().unwrap();
    exercise_basic_contract(&store).await;
    exercise_records(&store).await;
}

#[tokio::test]
async fn memory_store_honors_kv_contract() {
    let store = MemoryKvStore::new();
    exercise_basic_contract(&store).await;
    exercise_records(&store).await;
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let job = Job::from_draft(JobDraft::new("Staff Engineer"), 0);
    {
        let store = SqliteKvStore::open(&path).unwrap();
        save(&store, &job).await.unwrap();
    }

    let reopened = SqliteKvStore::open(&path).unwrap();
    let loaded: Vec<Job> = load_all(&reopened).await.unwrap();
    assert_eq!(loaded, vec![job]);
}

#[tokio::test]
async fn malformed_body_surfaces_invalid_data() {
    let store = MemoryKvStore::new();
    store
        .put(Collection::Jobs, "broken", json!({ "title": 7 }))
        .await
        .unwrap();

    match load_all::<Job, _>(&store).await {
        Err(StoreError::InvalidData(message)) => assert!(message.contains("broken")),
        other => panic!("unexpected result: {other:?}"),
    }
}

async fn exercise_write_batch<S: KvStore>(store: &S) {
    let job = Job::from_draft(JobDraft::new("Rust Engineer"), 0);
    let candidate = Candidate::from_draft(CandidateDraft {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        job_id: job.id,
        notes: String::new(),
    });
    let event = TimelineEvent::stage_change(candidate.id, Stage::Applied, None);

    let batch = WriteBatch::new()
        .put(&job)
        .unwrap()
        .put(&candidate)
        .unwrap()
        .put(&event)
        .unwrap();
    assert_eq!(batch.len(), 3);
    batch.commit(store).await.unwrap();
    WriteBatch::new().commit(store).await.unwrap();

    assert_eq!(load_all::<Job, _>(store).await.unwrap(), vec![job]);
    assert_eq!(load_all::<Candidate, _>(store).await.unwrap(), vec![candidate]);
    assert_eq!(load_all::<TimelineEvent, _>(store).await.unwrap(), vec![event]);
}

#[tokio::test]
async fn write_batch_spans_collections() {
    exercise_write_batch(&SqliteKvStore::open_in_memory().unwrap()).await;
    exercise_write_batch(&MemoryKvStore::new()).await;
}

#[tokio::test]
async fn sqlite_write_batch_is_all_or_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let store = SqliteKvStore::open(&path).unwrap();

    let other = rusqlite::Connection::open(&path).unwrap();
    other
        .execute_batch("DROP TABLE timeline_events;")
        .unwrap();
    drop(other);

    let result = store
        .write_batch(vec![
            BatchEntry {
                collection: Collection::Candidates,
                key: "c1".to_string(),
                body: json!({ "name": "Ada" }),
            },
            BatchEntry {
                collection: Collection::TimelineEvents,
                key: "e1".to_string(),
                body: json!({ "note": "Application received" }),
            },
        ])
        .await;

    assert!(matches!(result, Err(StoreError::Db(_))));
    assert!(store.get_all(Collection::Candidates).await.unwrap().is_empty());
}
