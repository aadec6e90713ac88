//! Core domain logic for the hiring board.
//! This crate is the single source of truth for board invariants.

pub mod assessment;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod remote;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::{BoardConfig, ConfigError, RemoteConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::assessment::{Assessment, Question, QuestionKind, Section};
pub use model::candidate::{Candidate, CandidateDraft, CandidateId, CandidatePatch, Stage};
pub use model::job::{Job, JobDraft, JobId, JobPatch, JobStatus};
pub use model::timeline::{TimelineEvent, TimelineEventKind};
pub use model::validation::ValidationError;
pub use query::{CandidateQuery, JobQuery, Page};
pub use remote::{RemoteError, RemoteResult, SimulatedRemote};
pub use repo::kv::{Collection, KvStore, StoreError, StoreResult};
pub use repo::memory_kv::MemoryKvStore;
pub use repo::sqlite_kv::SqliteKvStore;
pub use seed::{seed, SeedOptions, SeedReport};
pub use service::board::{Board, BoardIntent, IntentResult};
pub use service::coordinator::{BoardState, MutationCoordinator, MutationOutcome};
pub use service::CoordinatorError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
