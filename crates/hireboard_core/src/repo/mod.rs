//! Persistence layer: the key/value Store behind the simulated remote.
//!
//! # Responsibility
//! - Define the async `KvStore` contract over the four board collections.
//! - Keep SQLite details inside `SqliteKvStore`.
//! - Offer typed, serde-backed record helpers.
//!
//! # Invariants
//! - Read paths reject malformed persisted JSON instead of masking it.

pub mod kv;
pub mod memory_kv;
pub mod records;
pub mod sqlite_kv;
