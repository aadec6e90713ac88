//! SQLite-backed key/value store.
//!
//! # Invariants
//! - Every collection maps to one migrated table with `(record_key, body)`.
//! - Upserts keep the original `rowid`, so insertion order survives overwrites.
//! - `put_many` and `write_batch` each run inside one IMMEDIATE transaction.

use super::kv::{BatchEntry, Collection, KvStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory, verify_schema};
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Key/value store over one SQLite connection.
///
/// Calls are short local statements; the connection is guarded by a mutex
/// rather than moved to a blocking pool.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Wraps an already-migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        verify_schema(&conn, Collection::ALL.map(Collection::table))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Io("sqlite connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT record_key, body FROM {} ORDER BY rowid ASC;",
            collection.table()
        ))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let body: String = row.get(1)?;
            let value = parse_body(collection, &key, &body)?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>> {
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT body FROM {} WHERE record_key = ?1;",
                    collection.table()
                ),
                [key],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|body| parse_body(collection, key, &body))
            .transpose()
    }

    async fn put(&self, collection: Collection, key: &str, body: Value) -> StoreResult<()> {
        let conn = self.lock()?;
        upsert(&conn, collection, key, &body)?;
        Ok(())
    }

    async fn put_many(
        &self,
        collection: Collection,
        entries: Vec<(String, Value)>,
    ) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for (key, body) in &entries {
            upsert(&tx, collection, key, body)?;
        }
        tx.commit()?;
        debug!(
            "event=store_put_many module=repo status=ok collection={collection} count={}",
            entries.len()
        );
        Ok(())
    }

    async fn write_batch(&self, entries: Vec<BatchEntry>) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for entry in &entries {
            upsert(&tx, entry.collection, &entry.key, &entry.body)?;
        }
        tx.commit()?;
        debug!(
            "event=store_write_batch module=repo status=ok count={}",
            entries.len()
        );
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            &format!("DELETE FROM {} WHERE record_key = ?1;", collection.table()),
            [key],
        )?;
        Ok(changed > 0)
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(&format!("DELETE FROM {};", collection.table()), [])?;
        Ok(())
    }
}

fn upsert(conn: &Connection, collection: Collection, key: &str, body: &Value) -> StoreResult<()> {
    let text = serde_json::to_string(body)?;
    conn.execute(
        &format!(
            "INSERT INTO {} (record_key, body, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(record_key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at;",
            collection.table()
        ),
        params![key, text],
    )?;
    Ok(())
}

fn parse_body(collection: Collection, key: &str, body: &str) -> StoreResult<Value> {
    serde_json::from_str(body).map_err(|err| {
        StoreError::InvalidData(format!("{collection}[{key}] is not valid JSON: {err}"))
    })
}
