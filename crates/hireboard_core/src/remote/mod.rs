//! Simulated remote API over the local store.
//!
//! # Responsibility
//! - Delay every call by a sampled latency.
//! - Inject independent failures into mutating calls before any store write.
//! - Run filtering/pagination and derived writes (rank shifts, timeline entries).
//!
//! # Invariants
//! - Reads never fail by injection; mutations never retry.
//! - A failed mutation leaves every stored record untouched.

mod api;
pub mod fault;
pub mod latency;
pub mod reorder;

pub use api::SimulatedRemote;

use crate::model::validation::ValidationError;
use crate::repo::kv::{Collection, StoreError};
use reorder::ShiftError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug)]
pub enum RemoteError {
    /// Injected failure. Carries no retry metadata.
    Transient { op: &'static str },
    /// Input rejected before the call went out.
    Validation(ValidationError),
    NotFound { collection: Collection, key: String },
    /// Reorder indices are out of range or no longer match the stored ranking.
    InvalidMove(ShiftError),
    Store(StoreError),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub(crate) fn not_found(collection: Collection, key: impl ToString) -> Self {
        Self::NotFound {
            collection,
            key: key.to_string(),
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient { op } => write!(f, "{op}: operation failed"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { collection, key } => write!(f, "{collection} record not found: {key}"),
            Self::InvalidMove(ShiftError::UnknownJob(id)) => write!(f, "job not found: {id}"),
            Self::InvalidMove(ShiftError::OutOfRange { from, to, len }) => write!(
                f,
                "reorder {from} -> {to} is out of range for {len} jobs"
            ),
            Self::InvalidMove(ShiftError::StalePosition {
                job_id,
                stored,
                from,
            }) => write!(
                f,
                "job {job_id} is stored at position {stored}, not {from}"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RemoteError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for RemoteError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ShiftError> for RemoteError {
    fn from(value: ShiftError) -> Self {
        Self::InvalidMove(value)
    }
}
