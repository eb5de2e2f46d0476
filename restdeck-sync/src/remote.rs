//! Remote data-service contract and change-feed types.
//!
//! The backend exposes table-style CRUD per entity kind plus a
//! subscribe-to-change-feed primitive. Implementations deliver change
//! notices into the sender handed to `subscribe`; the service loop owns
//! the receiving end.

use crate::error::SyncResult;
use async_trait::async_trait;
use restdeck_types::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Row-level change reported by the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Insert,
    Update,
    Delete,
}

/// Inbound change notice for one row of one entity kind.
#[derive(Clone, Debug)]
pub struct ChangeNotice {
    pub kind: EntityKind,
    pub change_type: ChangeType,
    pub new_record: Option<Value>,
    pub old_record: Option<Value>,
}

impl ChangeNotice {
    /// The record carried by this notice: the new row, or for deletes the
    /// last known old row.
    pub fn record(&self) -> Option<&Value> {
        match self.change_type {
            ChangeType::Delete => self.old_record.as_ref(),
            _ => self.new_record.as_ref(),
        }
    }
}

/// Owner filter applied to a subscription or list call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub owner_id: Option<String>,
}

impl SubscriptionFilter {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
        }
    }
}

/// One open change-feed channel for one (kind, filter) pair.
///
/// Lifecycle is strictly bound to the sync enable/disable cycle: handles
/// are opened together on enable and closed together on disable.
#[derive(Debug)]
pub struct SubscriptionHandle {
    pub kind: EntityKind,
    pub filter: SubscriptionFilter,
    feed_task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn new(kind: EntityKind, filter: SubscriptionFilter) -> Self {
        Self {
            kind,
            filter,
            feed_task: None,
        }
    }

    /// Handle backed by a background feed task (poll-based implementations).
    pub fn with_feed_task(kind: EntityKind, filter: SubscriptionFilter, task: JoinHandle<()>) -> Self {
        Self {
            kind,
            filter,
            feed_task: Some(task),
        }
    }

    /// Stops the background feed task, if any.
    pub fn abort_feed(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
        }
    }
}

/// Backend contract: per-kind CRUD plus change-feed subscriptions.
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    async fn list(&self, kind: EntityKind, filter: &SubscriptionFilter) -> SyncResult<Vec<Value>>;

    async fn create(&self, kind: EntityKind, payload: &Value) -> SyncResult<Value>;

    async fn update(&self, kind: EntityKind, id: &str, payload: &Value) -> SyncResult<Value>;

    async fn subscribe(
        &self,
        kind: EntityKind,
        filter: SubscriptionFilter,
        notices: mpsc::Sender<ChangeNotice>,
    ) -> SyncResult<SubscriptionHandle>;

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> SyncResult<()>;
}
