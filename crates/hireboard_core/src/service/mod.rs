//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate remote calls into use-case level APIs.
//! - Own optimistic board state and its rollback behavior.
//! - Keep CLI callers decoupled from storage and latency details.

pub mod assessment_service;
pub mod board;
pub mod coordinator;
pub mod job_service;

use crate::model::candidate::CandidateId;
use crate::model::job::JobId;
use crate::model::validation::ValidationError;
use crate::remote::RemoteError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for board use-cases.
#[derive(Debug)]
pub enum CoordinatorError {
    /// Input rejected locally or by the remote.
    Validation(ValidationError),
    /// Target job is not on the board.
    UnknownJob(JobId),
    /// Target candidate is not on the board.
    UnknownCandidate(CandidateId),
    /// Requested position is outside the displayed list.
    OutOfRange { from: usize, to: usize, len: usize },
    /// Caller's view of the job position disagrees with the displayed state.
    StaleView {
        job_id: JobId,
        expected: usize,
        actual: usize,
    },
    /// Non-transient remote failure.
    Remote(RemoteError),
    /// Re-reading the authoritative state failed.
    Reload(RemoteError),
}

impl Display for CoordinatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownJob(id) => write!(f, "job not found on board: {id}"),
            Self::UnknownCandidate(id) => write!(f, "candidate not found on board: {id}"),
            Self::OutOfRange { from, to, len } => {
                write!(f, "position out of range: from={from} to={to} len={len}")
            }
            Self::StaleView {
                job_id,
                expected,
                actual,
            } => write!(
                f,
                "stale view for job {job_id}: expected position {expected}, displayed at {actual}"
            ),
            Self::Remote(err) => write!(f, "{err}"),
            Self::Reload(err) => write!(f, "reload after failed mutation: {err}"),
        }
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Remote(err) | Self::Reload(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RemoteError> for CoordinatorError {
    fn from(value: RemoteError) -> Self {
        match value {
            RemoteError::Validation(err) => Self::Validation(err),
            other => Self::Remote(other),
        }
    }
}

impl From<ValidationError> for CoordinatorError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
