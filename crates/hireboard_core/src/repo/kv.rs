//! Key/value store contract shared by every board collection.
//!
//! # Responsibility
//! - Name the four persisted collections.
//! - Define the async `KvStore` seam the simulated remote is built on.
//!
//! # Invariants
//! - `get_all` returns entries in insertion order; overwriting a key keeps its slot.
//! - `put_many` and `write_batch` are all-or-nothing.

use crate::db::DbError;
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted collections, each keyed by record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Jobs,
    Candidates,
    Assessments,
    TimelineEvents,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Jobs,
        Collection::Candidates,
        Collection::Assessments,
        Collection::TimelineEvents,
    ];

    /// Backing table name; also used in log lines.
    pub fn table(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Candidates => "candidates",
            Self::Assessments => "assessments",
            Self::TimelineEvents => "timeline_events",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Generic store failure, the only error a `KvStore` call can surface.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Store could not be reached (lock poisoned, backend gone).
    Io(String),
    /// Persisted body does not decode into the expected record.
    InvalidData(String),
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(message) => write!(f, "store unavailable: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
            Self::Serialization(err) => write!(f, "record serialization failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Io(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// One write inside a [`KvStore::write_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub collection: Collection,
    pub key: String,
    pub body: Value,
}

/// Async key/value persistence over the board collections.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// All `(key, body)` pairs in insertion order.
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>>;
    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>>;
    /// Inserts or overwrites one record.
    async fn put(&self, collection: Collection, key: &str, body: Value) -> StoreResult<()>;
    /// Writes a batch atomically: either every entry lands or none does.
    async fn put_many(&self, collection: Collection, entries: Vec<(String, Value)>)
        -> StoreResult<()>;
    /// Writes entries that may span collections, atomically.
    async fn write_batch(&self, entries: Vec<BatchEntry>) -> StoreResult<()>;
    /// Returns whether a record was removed.
    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<bool>;
    async fn clear(&self, collection: Collection) -> StoreResult<()>;
}
