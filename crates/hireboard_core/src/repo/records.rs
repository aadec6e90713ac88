//! Typed access to `KvStore` collections through serde.

use super::kv::{BatchEntry, Collection, KvStore, StoreError, StoreResult};
use crate::model::assessment::Assessment;
use crate::model::candidate::Candidate;
use crate::model::job::Job;
use crate::model::timeline::TimelineEvent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A record type stored in exactly one collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn record_key(&self) -> String;
}

impl Record for Job {
    const COLLECTION: Collection = Collection::Jobs;

    fn record_key(&self) -> String {
        self.id.to_string()
    }
}

impl Record for Candidate {
    const COLLECTION: Collection = Collection::Candidates;

    fn record_key(&self) -> String {
        self.id.to_string()
    }
}

impl Record for Assessment {
    const COLLECTION: Collection = Collection::Assessments;

    fn record_key(&self) -> String {
        self.job_id.to_string()
    }
}

impl Record for TimelineEvent {
    const COLLECTION: Collection = Collection::TimelineEvents;

    fn record_key(&self) -> String {
        self.id.to_string()
    }
}

/// Loads every record of `T` in insertion order.
pub async fn load_all<T, S>(store: &S) -> StoreResult<Vec<T>>
where
    T: Record,
    S: KvStore + ?Sized,
{
    store
        .get_all(T::COLLECTION)
        .await?
        .into_iter()
        .map(|(key, body)| decode(T::COLLECTION, &key, body))
        .collect()
}

pub async fn load<T, S>(store: &S, key: &str) -> StoreResult<Option<T>>
where
    T: Record,
    S: KvStore + ?Sized,
{
    store
        .get(T::COLLECTION, key)
        .await?
        .map(|body| decode(T::COLLECTION, key, body))
        .transpose()
}

pub async fn save<T, S>(store: &S, record: &T) -> StoreResult<()>
where
    T: Record,
    S: KvStore + ?Sized,
{
    let body = serde_json::to_value(record)?;
    store
        .put(T::COLLECTION, &record.record_key(), body)
        .await
}

/// Saves a batch of records atomically.
pub async fn save_all<T, S>(store: &S, records: &[T]) -> StoreResult<()>
where
    T: Record,
    S: KvStore + ?Sized,
{
    let entries = records
        .iter()
        .map(|record| -> StoreResult<(String, Value)> {
            Ok((record.record_key(), serde_json::to_value(record)?))
        })
        .collect::<StoreResult<Vec<_>>>()?;
    store.put_many(T::COLLECTION, entries).await
}

/// Records from several collections written as one unit.
#[derive(Debug, Default)]
pub struct WriteBatch {
    entries: Vec<BatchEntry>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Record>(mut self, record: &T) -> StoreResult<Self> {
        self.entries.push(BatchEntry {
            collection: T::COLLECTION,
            key: record.record_key(),
            body: serde_json::to_value(record)?,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn commit<S: KvStore + ?Sized>(self, store: &S) -> StoreResult<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        store.write_batch(self.entries).await
    }
}

pub async fn remove<T, S>(store: &S, key: &str) -> StoreResult<bool>
where
    T: Record,
    S: KvStore + ?Sized,
{
    store.delete(T::COLLECTION, key).await
}

fn decode<T: Record>(collection: Collection, key: &str, body: Value) -> StoreResult<T> {
    serde_json::from_value(body).map_err(|err| {
        StoreError::InvalidData(format!("{collection}[{key}]: {err}"))
    })
}
