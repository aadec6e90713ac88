//! In-process key/value store for tests and throwaway sessions.

use super::kv::{BatchEntry, Collection, KvStore, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Table {
    next_seq: u64,
    slots: BTreeMap<u64, (String, Value)>,
    index: HashMap<String, u64>,
}

impl Table {
    fn upsert(&mut self, key: String, body: Value) {
        match self.index.get(&key) {
            Some(seq) => {
                self.slots.insert(*seq, (key, body));
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.index.insert(key.clone(), seq);
                self.slots.insert(seq, (key, body));
            }
        }
    }
}

/// Insertion-ordered in-memory store. Writes are immediately visible.
#[derive(Default)]
pub struct MemoryKvStore {
    tables: Mutex<HashMap<Collection, Table>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<Collection, Table>>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Io("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<(String, Value)>> {
        let tables = self.lock()?;
        Ok(tables
            .get(&collection)
            .map(|table| table.slots.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Value>> {
        let tables = self.lock()?;
        Ok(tables.get(&collection).and_then(|table| {
            table
                .index
                .get(key)
                .and_then(|seq| table.slots.get(seq))
                .map(|(_, body)| body.clone())
        }))
    }

    async fn put(&self, collection: Collection, key: &str, body: Value) -> StoreResult<()> {
        let mut tables = self.lock()?;
        tables
            .entry(collection)
            .or_default()
            .upsert(key.to_string(), body);
        Ok(())
    }

    async fn put_many(
        &self,
        collection: Collection,
        entries: Vec<(String, Value)>,
    ) -> StoreResult<()> {
        let mut tables = self.lock()?;
        let table = tables.entry(collection).or_default();
        for (key, body) in entries {
            table.upsert(key, body);
        }
        Ok(())
    }

    async fn write_batch(&self, entries: Vec<BatchEntry>) -> StoreResult<()> {
        let mut tables = self.lock()?;
        for entry in entries {
            tables
                .entry(entry.collection)
                .or_default()
                .upsert(entry.key, entry.body);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        let Some(table) = tables.get_mut(&collection) else {
            return Ok(false);
        };
        match table.index.remove(key) {
            Some(seq) => {
                table.slots.remove(&seq);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        let mut tables = self.lock()?;
        tables.remove(&collection);
        Ok(())
    }
}
