use hireboard_core::assessment::{Answer, AnswerErrorKind, Answers};
use hireboard_core::remote::fault::NeverFail;
use hireboard_core::remote::latency::LatencyPolicy;
use hireboard_core::{
    Assessment, Board, BoardIntent, CoordinatorError, IntentResult, JobDraft, Question,
    QuestionKind, Section, SimulatedRemote, SqliteKvStore, ValidationError,
};
use std::sync::Arc;

async fn sqlite_board() -> Board<SqliteKvStore> {
    let store = Arc::new(SqliteKvStore::open_in_memory().unwrap());
    let remote = SimulatedRemote::new(store)
        .with_latency(LatencyPolicy::none())
        .with_faults(NeverFail);
    Board::open(Arc::new(remote)).await.unwrap()
}

async fn create_job(board: &Board<SqliteKvStore>, title: &str) -> uuid::Uuid {
    match board
        .dispatch(BoardIntent::CreateJob(JobDraft::new(title)))
        .await
        .unwrap()
    {
        IntentResult::Job(job) => job.id,
        other => panic!("unexpected result: {other:?}"),
    }
}

fn screening_form(job_id: uuid::Uuid) -> Assessment {
    let mut assessment = Assessment::empty(job_id)
        .with_section(
            Section::new("profile", "Profile")
                .with_question(
                    Question::new("years", QuestionKind::Number, "Years of experience")
                        .required()
                        .with_range(Some(0.0), Some(40.0)),
                )
                .with_question(
                    Question::new("stack", QuestionKind::Multi, "Stacks")
                        .with_options(["rust", "go", "java"]),
                )
                .with_question(
                    Question::new("rust-detail", QuestionKind::Long, "Tell us about Rust")
                        .required()
                        .with_max_length(10)
                        .shown_when("stack", "rust"),
                ),
        )
        .with_section(
            Section::new("files", "Files")
                .with_question(Question::new("cv", QuestionKind::File, "Resume").required()),
        );
    assessment.title = "Screening".to_string();
    assessment
}

#[tokio::test]
async fn saved_assessment_loads_structurally_equal() {
    let board = sqlite_board().await;
    let job_id = create_job(&board, "Rust Engineer").await;
    let form = screening_form(job_id);

    let saved = match board
        .dispatch(BoardIntent::SaveAssessment(form.clone()))
        .await
        .unwrap()
    {
        IntentResult::Assessment(saved) => saved,
        other => panic!("unexpected result: {other:?}"),
    };
    assert!(saved.updated_at > 0);

    let loaded = board.assessments().load(job_id).await.unwrap();
    assert_eq!(loaded.sections, form.sections);
    assert_eq!(loaded.title, form.title);
    assert_eq!(loaded, saved);
}

#[tokio::test]
async fn missing_assessment_loads_empty() {
    let board = sqlite_board().await;
    let job_id = create_job(&board, "Designer").await;

    let loaded = board.assessments().load(job_id).await.unwrap();
    assert_eq!(loaded, Assessment::empty(job_id));
}

#[tokio::test]
async fn invalid_assessment_is_rejected_before_save() {
    let board = sqlite_board().await;
    let job_id = create_job(&board, "Designer").await;
    let form = Assessment::empty(job_id).with_section(
        Section::new("s", "Only")
            .with_question(Question::new("q", QuestionKind::Short, "One"))
            .with_question(Question::new("q", QuestionKind::Short, "Two")),
    );

    let err = board
        .dispatch(BoardIntent::SaveAssessment(form))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::Validation(ValidationError::DuplicateQuestionId(ref id)) if id == "q"
    ));
    assert_eq!(
        board.assessments().load(job_id).await.unwrap(),
        Assessment::empty(job_id)
    );
}

#[tokio::test]
async fn preview_follows_direct_conditions() {
    let board = sqlite_board().await;
    let job_id = create_job(&board, "Rust Engineer").await;
    board
        .assessments()
        .save(screening_form(job_id))
        .await
        .unwrap();

    let mut answers = Answers::new();
    answers.insert("years".to_string(), Answer::Number(55.0));
    answers.insert(
        "stack".to_string(),
        Answer::Choices(vec!["rust".to_string()]),
    );
    answers.insert(
        "rust-detail".to_string(),
        Answer::Text("far too long for the limit".to_string()),
    );

    let preview = board.assessments().preview(job_id, &answers).await.unwrap();

    assert_eq!(preview.visible, vec!["years", "stack", "rust-detail", "cv"]);
    let kinds: Vec<(&str, &AnswerErrorKind)> = preview
        .errors
        .iter()
        .map(|error| (error.question_id.as_str(), &error.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (
                "years",
                &AnswerErrorKind::OutOfRange {
                    min: Some(0.0),
                    max: Some(40.0)
                }
            ),
            ("rust-detail", &AnswerErrorKind::TooLong { max_length: 10 }),
            ("cv", &AnswerErrorKind::Required),
        ]
    );
}

#[tokio::test]
async fn assessment_for_unknown_job_is_rejected() {
    let board = sqlite_board().await;
    let missing = uuid::Uuid::new_v4();

    let err = board
        .assessments()
        .save(Assessment::empty(missing))
        .await
        .unwrap_err();
    assert!(err.to_string().contains(&missing.to_string()));
}
