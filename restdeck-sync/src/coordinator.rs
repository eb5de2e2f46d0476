//! Sync coordinator — enablement lifecycle, full resync, queue flushing,
//! and connectivity handling.
//!
//! Exclusively owns the pending auto-save queue and the open subscription
//! handles. View code never touches either directly; it goes through the
//! service handle (`queue_auto_save`, `force_sync_now`, `enable_sync`,
//! `disable_sync`).

use crate::auth::AuthContext;
use crate::conflict::{self, ConflictStrategy};
use crate::queue::{SaveQueue, SyncQueueItem};
use crate::remote::{ChangeNotice, ChangeType, RemoteDataService, SubscriptionFilter, SubscriptionHandle};
use chrono::{DateTime, Utc};
use restdeck_storage::{backup_key, KvStore};
use restdeck_types::{DomainEvent, EntityKind, NEW_ENTITY_ID};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Point-in-time projection of the coordinator's state, recomputed on
/// demand and never cached.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub enabled: bool,
    pub syncing: bool,
    pub online: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub queue_length: usize,
    pub subscription_count: usize,
}

pub struct SyncCoordinator {
    auth: Arc<dyn AuthContext>,
    remote: Arc<dyn RemoteDataService>,
    store: Arc<dyn KvStore>,
    events: broadcast::Sender<DomainEvent>,
    conflict_strategy: ConflictStrategy,
    queue: SaveQueue,
    subscriptions: Vec<SubscriptionHandle>,
    enabled: bool,
    syncing: bool,
    online: bool,
    last_sync_at: Option<DateTime<Utc>>,
}

impl SyncCoordinator {
    pub fn new(
        auth: Arc<dyn AuthContext>,
        remote: Arc<dyn RemoteDataService>,
        store: Arc<dyn KvStore>,
        events: broadcast::Sender<DomainEvent>,
        conflict_strategy: ConflictStrategy,
    ) -> Self {
        Self {
            auth,
            remote,
            store,
            events,
            conflict_strategy,
            queue: SaveQueue::new(),
            subscriptions: Vec::new(),
            enabled: false,
            syncing: false,
            online: true,
            last_sync_at: None,
        }
    }

    /// Opens one change-feed subscription per tracked kind, runs one full
    /// resync, then flips to enabled and emits `sync-enabled`.
    ///
    /// No-op when already enabled. Refuses silently when no principal is
    /// authenticated — callers check `is_authenticated()` or wait for the
    /// signed-in notification.
    pub async fn enable_sync(&mut self, notices: &mpsc::Sender<ChangeNotice>) {
        if self.enabled {
            debug!("sync already enabled");
            return;
        }
        if !self.auth.is_authenticated() {
            debug!("sync enable refused: no authenticated principal");
            return;
        }
        let Some(owner) = self.auth.current_principal_id() else {
            debug!("sync enable refused: no principal id");
            return;
        };

        for kind in EntityKind::ALL {
            let filter = self.kind_filter(kind, &owner);
            match self.remote.subscribe(kind, filter, notices.clone()).await {
                Ok(handle) => self.subscriptions.push(handle),
                Err(e) => warn!("change-feed subscribe failed for {kind}: {e}"),
            }
        }

        self.perform_full_sync().await;
        self.enabled = true;
        info!("sync enabled ({} subscriptions)", self.subscriptions.len());
        self.emit(DomainEvent::SyncEnabled);
    }

    /// Closes every open subscription handle together and emits
    /// `sync-disabled`. Idempotent; never touches the queue.
    pub async fn disable_sync(&mut self) {
        if !self.enabled {
            return;
        }
        let handles: Vec<SubscriptionHandle> = self.subscriptions.drain(..).collect();
        for handle in handles {
            let kind = handle.kind;
            if let Err(e) = self.remote.unsubscribe(handle).await {
                warn!("unsubscribe failed for {kind}: {e}");
            }
        }
        self.enabled = false;
        info!("sync disabled");
        self.emit(DomainEvent::SyncDisabled);
    }

    /// Fetches the authoritative list for each tracked kind and writes it
    /// to local storage as a backup snapshot.
    ///
    /// Guarded by the `syncing` flag: a pass already in flight collapses a
    /// second invocation into a no-op. A per-kind failure is logged and the
    /// pass continues; `sync-error` is emitted only when no kind succeeded.
    pub async fn perform_full_sync(&mut self) {
        if self.syncing {
            debug!("full sync already in progress");
            return;
        }
        self.syncing = true;

        let owner = self.auth.current_principal_id().unwrap_or_default();
        let mut succeeded = 0usize;
        for kind in EntityKind::ALL {
            let filter = self.kind_filter(kind, &owner);
            match self.remote.list(kind, &filter).await {
                Ok(rows) => match serde_json::to_string(&rows) {
                    Ok(snapshot) => match self.store.set(&backup_key(kind), &snapshot) {
                        Ok(()) => {
                            debug!("backed up {} {kind} rows", rows.len());
                            succeeded += 1;
                        }
                        Err(e) => warn!("backup write failed for {kind}: {e}"),
                    },
                    Err(e) => warn!("backup serialization failed for {kind}: {e}"),
                },
                Err(e) => warn!("resync list failed for {kind}: {e}"),
            }
        }

        self.syncing = false;
        if succeeded > 0 {
            let completed_at = Utc::now();
            self.last_sync_at = Some(completed_at);
            self.emit(DomainEvent::SyncCompleted { completed_at });
        } else {
            self.emit(DomainEvent::SyncError {
                message: "full sync made no progress".to_string(),
            });
        }
    }

    /// Coalesces a local mutation into the pending queue. The debounce
    /// timer lives in the service loop and is re-armed on every call.
    pub fn queue_auto_save(&mut self, kind: EntityKind, id: impl Into<String>, payload: Value) {
        self.queue.enqueue(kind, id, payload);
    }

    /// Discards pending auto-save items; the service loop clears the armed
    /// debounce timer alongside.
    pub fn cancel_auto_save(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        if dropped > 0 {
            debug!("cancelled {dropped} pending auto-saves");
        }
    }

    /// Debounce callback. Skipped entirely while sync is disabled —
    /// mutations stay queued until sync is next enabled or a manual flush
    /// is triggered.
    pub async fn process_queue(&mut self) {
        if !self.enabled {
            debug!("queue flush skipped while disabled ({} pending)", self.queue.len());
            return;
        }
        let items = self.queue.take_pending();
        if items.is_empty() {
            return;
        }
        debug!("flushing {} queued mutations", items.len());

        for item in items {
            let result = if item.id == NEW_ENTITY_ID {
                self.remote.create(item.kind, &item.payload).await
            } else {
                self.remote.update(item.kind, &item.id, &item.payload).await
            };
            if let Err(e) = result {
                warn!("write-back failed for {} {}, re-queued: {e}", item.kind, item.id);
                self.queue.requeue(item);
            }
        }
    }

    /// Applies the configured conflict strategy when a change-feed echo
    /// arrives for an entity that still has a pending unflushed payload.
    pub fn reconcile(&self, mut notice: ChangeNotice) -> ChangeNotice {
        if notice.change_type != ChangeType::Update {
            return notice;
        }
        let Some(remote) = notice.new_record.take() else {
            return notice;
        };
        let resolved = match remote
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| self.queue.pending_payload(notice.kind, id))
        {
            Some(local) => conflict::resolve_conflict(local, &remote, self.conflict_strategy),
            None => remote,
        };
        notice.new_record = Some(resolved);
        notice
    }

    /// Connectivity restored: when enabled, triggers exactly one full sync.
    pub async fn handle_online(&mut self) {
        self.online = true;
        self.emit(DomainEvent::ConnectionRestored);
        if self.enabled {
            self.perform_full_sync().await;
        }
    }

    /// Connectivity lost: nothing is torn down — queued mutations and
    /// subscriptions resume when connectivity returns.
    pub fn handle_offline(&mut self) {
        self.online = false;
        self.emit(DomainEvent::ConnectionLost);
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            enabled: self.enabled,
            syncing: self.syncing,
            online: self.online,
            last_sync_at: self.last_sync_at,
            queue_length: self.queue.len(),
            subscription_count: self.subscriptions.len(),
        }
    }

    pub fn pending_changes(&self) -> Vec<SyncQueueItem> {
        self.queue.items()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.last_sync_at
    }

    /// Collections are scoped to their owner; the remaining kinds are
    /// subscribed and listed unfiltered.
    fn kind_filter(&self, kind: EntityKind, owner: &str) -> SubscriptionFilter {
        match kind {
            EntityKind::Collection if !owner.is_empty() => SubscriptionFilter::owned_by(owner),
            _ => SubscriptionFilter::unfiltered(),
        }
    }

    fn emit(&self, event: DomainEvent) {
        // No receiver (or a lagged one) is fine; views come and go.
        let _ = self.events.send(event);
    }
}
