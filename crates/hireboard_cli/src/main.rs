//! `hireboard` command-line front end.
//!
//! # Responsibility
//! - Parse user intents and route them through the core board services.
//! - Print compact, line-oriented results for scripting.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use hireboard_core::assessment::{Answer, Answers};
use hireboard_core::service::assessment_service::preview_answers;
use hireboard_core::{
    init_from_config, seed, Assessment, Board, BoardConfig, BoardIntent, CandidateQuery,
    IntentResult, Job, JobDraft, JobQuery, JobStatus, KvStore, MemoryKvStore,
    MutationOutcome, QuestionKind, SeedOptions, SimulatedRemote, SqliteKvStore, Stage,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "hireboard", version = hireboard_core::core_version(), about = "Hiring board over a local store")]
struct Cli {
    /// TOML config file; `HIREBOARD_*` env vars override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured database path.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Use a throwaway in-memory store (seeded before the command runs).
    #[arg(long)]
    memory: bool,
    /// Disable simulated latency and failures.
    #[arg(long)]
    fast: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace all data with generated demo data.
    Seed(SeedArgs),
    #[command(subcommand)]
    Jobs(JobsCommand),
    #[command(subcommand)]
    Candidates(CandidatesCommand),
    /// Print the candidate board grouped by stage.
    Board {
        #[arg(long, default_value_t = 3)]
        per_stage: usize,
    },
    #[command(subcommand)]
    Assessment(AssessmentCommand),
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long, default_value_t = 25)]
    jobs: usize,
    #[arg(long, default_value_t = 1000)]
    candidates: usize,
    #[arg(long, default_value_t = 3)]
    assessments: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl SeedArgs {
    fn options(&self) -> SeedOptions {
        SeedOptions {
            jobs: self.jobs,
            candidates: self.candidates,
            assessments: self.assessments,
            seed: self.seed,
        }
    }
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Create {
        title: String,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Archive {
        id: Uuid,
    },
    Restore {
        id: Uuid,
    },
    /// Move a job from board position `from` to `to` (0-based).
    Reorder {
        id: Uuid,
        from: usize,
        to: usize,
    },
}

#[derive(Subcommand, Debug)]
enum CandidatesCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        job: Option<Uuid>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Move {
        id: Uuid,
        stage: String,
        #[arg(long)]
        note: Option<String>,
    },
    Note {
        id: Uuid,
        text: String,
    },
    Timeline {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum AssessmentCommand {
    Show {
        job_id: Uuid,
    },
    /// Evaluate `--answer question_id=value` pairs against a job's form.
    Preview {
        job_id: Uuid,
        #[arg(long = "answer")]
        answers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = BoardConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = config.log_dir.take() {
        config.log_dir = Some(std::env::current_dir()?.join(log_dir));
    }
    if cli.fast {
        config.remote.latency_min_ms = 0;
        config.remote.latency_max_ms = 0;
        config.remote.failure_rate = 0.0;
    }
    init_from_config(&config).context("initializing logging")?;

    if cli.memory {
        let store = Arc::new(MemoryKvStore::new());
        if !matches!(cli.command, Command::Seed(_)) {
            seed(&*store, SeedOptions::default()).await?;
        }
        run(store, &config, cli.command).await
    } else {
        let store = SqliteKvStore::open(&config.db_path)
            .with_context(|| format!("opening {}", config.db_path.display()))?;
        run(Arc::new(store), &config, cli.command).await
    }
}

async fn run<S: KvStore + 'static>(store: Arc<S>, config: &BoardConfig, command: Command) -> Result<()> {
    let remote = Arc::new(SimulatedRemote::from_config(Arc::clone(&store), &config.remote));
    info!("event=cli_start module=cli status=ok");

    match command {
        Command::Seed(args) => {
            let report = seed(&*store, args.options()).await?;
            println!(
                "seeded jobs={} candidates={} assessments={} timeline_events={}",
                report.jobs, report.candidates, report.assessments, report.timeline_events
            );
        }
        Command::Jobs(command) => run_jobs(remote, config, command).await?,
        Command::Candidates(command) => run_candidates(remote, config, command).await?,
        Command::Board { per_stage } => {
            let board = Board::open(remote).await?;
            for (stage, candidates) in board.coordinator().candidates_by_stage() {
                println!("{} ({})", stage.label(), candidates.len());
                for candidate in candidates.iter().take(per_stage) {
                    println!("  {}  {}", candidate.id, candidate.name);
                }
            }
        }
        Command::Assessment(command) => run_assessment(remote, command).await?,
    }
    Ok(())
}

async fn run_jobs<S: KvStore + 'static>(
    remote: Arc<SimulatedRemote<S>>,
    config: &BoardConfig,
    command: JobsCommand,
) -> Result<()> {
    let board = Board::open(remote).await?;
    match command {
        JobsCommand::List {
            search,
            status,
            tag,
            page,
        } => {
            let status = status
                .map(|value| JobStatus::parse(&value).ok_or_else(|| anyhow!("unknown status `{value}`")))
                .transpose()?;
            let query = JobQuery {
                search,
                status,
                tag,
                page,
                page_size: config.page_size,
            };
            let result = board.jobs().list_jobs(&query).await?;
            for job in &result.items {
                print_job(job);
            }
            println!(
                "page {}/{} total={}",
                result.page, result.total_pages, result.total
            );
        }
        JobsCommand::Create { title, slug, tags } => {
            let mut draft = JobDraft::new(title).with_tags(tags);
            draft.slug = slug;
            if let IntentResult::Job(job) = board.dispatch(BoardIntent::CreateJob(draft)).await? {
                print_job(&job);
            }
        }
        JobsCommand::Archive { id } => print_job(&board.jobs().archive_job(id).await?),
        JobsCommand::Restore { id } => print_job(&board.jobs().restore_job(id).await?),
        JobsCommand::Reorder { id, from, to } => {
            let intent = BoardIntent::Reorder {
                job_id: id,
                from,
                to,
            };
            if let IntentResult::Mutation(outcome) = board.dispatch(intent).await? {
                print_outcome(&outcome);
            }
        }
    }
    Ok(())
}

async fn run_candidates<S: KvStore + 'static>(
    remote: Arc<SimulatedRemote<S>>,
    config: &BoardConfig,
    command: CandidatesCommand,
) -> Result<()> {
    match command {
        CandidatesCommand::List {
            search,
            stage,
            job,
            page,
        } => {
            let stage = stage.map(|value| parse_stage(&value)).transpose()?;
            let query = CandidateQuery {
                search,
                stage,
                job_id: job,
                page,
                page_size: config.page_size,
            };
            let result = remote.list_candidates(&query).await?;
            for candidate in &result.items {
                println!(
                    "{}  {:<8} {}  <{}>",
                    candidate.id, candidate.stage, candidate.name, candidate.email
                );
            }
            println!(
                "page {}/{} total={}",
                result.page, result.total_pages, result.total
            );
        }
        CandidatesCommand::Move { id, stage, note } => {
            let board = Board::open(remote).await?;
            let intent = BoardIntent::SetStage {
                candidate_id: id,
                stage: parse_stage(&stage)?,
                note,
            };
            if let IntentResult::Mutation(outcome) = board.dispatch(intent).await? {
                print_outcome(&outcome);
            }
        }
        CandidatesCommand::Note { id, text } => {
            let event = remote.add_candidate_note(id, &text).await?;
            println!("noted {} at {}", event.candidate_id, event.timestamp);
        }
        CandidatesCommand::Timeline { id } => {
            for event in remote.candidate_timeline(id).await? {
                println!("{}  {:<8} {}", event.timestamp, event.stage, event.note);
            }
        }
    }
    Ok(())
}

async fn run_assessment<S: KvStore + 'static>(
    remote: Arc<SimulatedRemote<S>>,
    command: AssessmentCommand,
) -> Result<()> {
    let board = Board::new(remote);
    match command {
        AssessmentCommand::Show { job_id } => {
            let assessment = board.assessments().load(job_id).await?;
            print_assessment(&assessment);
        }
        AssessmentCommand::Preview { job_id, answers } => {
            let assessment = board.assessments().load(job_id).await?;
            let answers = parse_answers(&assessment, &answers)?;
            let preview = preview_answers(&assessment, &answers);
            println!("visible: {}", preview.visible.join(", "));
            for error in &preview.errors {
                println!("error: {error}");
            }
            if preview.is_submittable() {
                println!("submittable");
            }
        }
    }
    Ok(())
}

fn parse_stage(value: &str) -> Result<Stage> {
    Stage::parse(value).ok_or_else(|| anyhow!("unknown stage `{value}`"))
}

/// Interprets each `id=value` pair by the target question's kind.
fn parse_answers(assessment: &Assessment, raw: &[String]) -> Result<Answers> {
    let mut answers = Answers::new();
    for pair in raw {
        let Some((id, value)) = pair.split_once('=') else {
            bail!("answer `{pair}` is not in `id=value` form");
        };
        let question = assessment
            .questions()
            .find(|question| question.id == id)
            .ok_or_else(|| anyhow!("unknown question `{id}`"))?;
        let answer = match question.kind {
            QuestionKind::Single => Answer::Choice(value.to_string()),
            QuestionKind::Multi => Answer::Choices(
                value
                    .split(',')
                    .map(|choice| choice.trim().to_string())
                    .filter(|choice| !choice.is_empty())
                    .collect(),
            ),
            QuestionKind::Number => Answer::Number(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("`{id}` expects a number"))?,
            ),
            QuestionKind::File => Answer::File(value.to_string()),
            QuestionKind::Short | QuestionKind::Long => Answer::Text(value.to_string()),
        };
        answers.insert(id.to_string(), answer);
    }
    Ok(answers)
}

fn print_job(job: &Job) {
    let tags: Vec<&str> = job.tags.iter().map(String::as_str).collect();
    println!(
        "{:>3}  {}  {:<8} {}  [{}]",
        job.order,
        job.id,
        job.status.as_str(),
        job.title,
        tags.join(",")
    );
}

fn print_outcome(outcome: &MutationOutcome) {
    match outcome {
        MutationOutcome::Committed => println!("committed"),
        MutationOutcome::Unchanged => println!("unchanged"),
        MutationOutcome::RolledBack { reason } => println!("rolled back: {reason}"),
    }
}

fn print_assessment(assessment: &Assessment) {
    if assessment.sections.is_empty() {
        println!("no assessment for job {}", assessment.job_id);
        return;
    }
    println!("{}", assessment.title);
    for section in &assessment.sections {
        println!("## {}", section.title);
        for question in &section.questions {
            let marker = if question.required { "*" } else { " " };
            let condition = question
                .condition
                .as_ref()
                .map(|condition| format!("  (when {} = {})", condition.question_id, condition.equals))
                .unwrap_or_default();
            println!("{marker} {} [{:?}] {}{condition}", question.id, question.kind, question.text);
        }
    }
}

