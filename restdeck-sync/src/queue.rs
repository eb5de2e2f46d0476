//! Pending auto-save queue with last-write coalescing.

use chrono::{DateTime, Utc};
use restdeck_types::EntityKind;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct QueueKey {
    kind: EntityKind,
    id: String,
}

/// One pending local mutation awaiting write-back.
#[derive(Clone, Debug, Serialize)]
pub struct SyncQueueItem {
    pub kind: EntityKind,
    pub id: String,
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
}

/// Mutation queue keyed by (kind, id).
///
/// Owned exclusively by the coordinator; view code reaches it only through
/// the service handle.
#[derive(Default)]
pub struct SaveQueue {
    pending: HashMap<QueueKey, SyncQueueItem>,
}

impl SaveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coalesces by (kind, id): a second enqueue for the same key replaces
    /// the pending payload rather than appending.
    pub fn enqueue(&mut self, kind: EntityKind, id: impl Into<String>, payload: Value) {
        let id = id.into();
        let key = QueueKey {
            kind,
            id: id.clone(),
        };
        self.pending.insert(
            key,
            SyncQueueItem {
                kind,
                id,
                payload,
                enqueued_at: Utc::now(),
            },
        );
    }

    /// Drains a snapshot of the queue for one flush pass.
    pub fn take_pending(&mut self) -> Vec<SyncQueueItem> {
        self.pending.drain().map(|(_, item)| item).collect()
    }

    /// Re-inserts an item whose write-back failed — unless a newer payload
    /// for the same key was queued during the flush, which supersedes it.
    pub fn requeue(&mut self, item: SyncQueueItem) {
        let key = QueueKey {
            kind: item.kind,
            id: item.id.clone(),
        };
        self.pending.entry(key).or_insert(item);
    }

    /// Pending payload for one key, if any.
    pub fn pending_payload(&self, kind: EntityKind, id: &str) -> Option<&Value> {
        let key = QueueKey {
            kind,
            id: id.to_string(),
        };
        self.pending.get(&key).map(|item| &item.payload)
    }

    pub fn items(&self) -> Vec<SyncQueueItem> {
        self.pending.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
