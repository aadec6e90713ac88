//! SQLite backing for the key/value collections.
//!
//! Every collection is one table of `(record_key, body, updated_at)` rows;
//! the body is the record's JSON. `open_db*` migrate, and
//! [`verify_schema`] lets a store refuse a connection it cannot trust.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

use migrations::latest_version;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A registered migration script failed; nothing from it was kept.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// File was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was not migrated to the version this binary writes.
    SchemaMismatch { db_version: u32, expected: u32 },
    /// A collection table is absent even though the version matches.
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Migration { version, source } => {
                write!(f, "migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "board database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaMismatch {
                db_version,
                expected,
            } => write!(
                f,
                "board store needs schema version {expected}, connection is at {db_version}"
            ),
            Self::MissingTable(table) => write!(f, "collection table `{table}` is missing"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Checks that `conn` is at the latest schema and carries every `tables` entry.
pub fn verify_schema<I>(conn: &Connection, tables: I) -> DbResult<()>
where
    I: IntoIterator<Item = &'static str>,
{
    let db_version = schema_version(conn)?;
    let expected = latest_version();
    if db_version != expected {
        return Err(DbError::SchemaMismatch {
            db_version,
            expected,
        });
    }

    let mut stmt =
        conn.prepare("SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);")?;
    for table in tables {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}
