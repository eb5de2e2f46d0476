//! Local key-value persistence for RestDeck.
//!
//! The sync core persists per-kind backup snapshots (the last known-good
//! server state) through the `KvStore` contract. `MemoryKvStore` backs
//! tests and ephemeral sessions; `SqliteKvStore` is the durable store.

pub mod error;
pub mod kv;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use kv::{backup_key, KvStore, MemoryKvStore};
pub use sqlite::SqliteKvStore;
