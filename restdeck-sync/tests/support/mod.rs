#![allow(dead_code)]
//! Shared test support: a scriptable in-memory remote.

use async_trait::async_trait;
use restdeck_sync::{
    ChangeNotice, RemoteDataService, SubscriptionFilter, SubscriptionHandle, SyncError, SyncResult,
};
use restdeck_types::EntityKind;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use tokio::sync::mpsc;

static TRACING: Once = Once::new();

/// Installs a tracing subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// In-memory remote whose failures and rows are scripted per test.
#[derive(Default)]
pub struct MockRemote {
    rows: Mutex<HashMap<EntityKind, Vec<Value>>>,
    fail_list: Mutex<HashSet<EntityKind>>,
    fail_writes: Mutex<bool>,
    created: Mutex<Vec<(EntityKind, Value)>>,
    updated: Mutex<Vec<(EntityKind, String, Value)>>,
    feeds: Mutex<HashMap<EntityKind, mpsc::Sender<ChangeNotice>>>,
    pub subscribe_calls: AtomicUsize,
    pub unsubscribe_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rows(&self, kind: EntityKind, rows: Vec<Value>) {
        self.rows.lock().unwrap().insert(kind, rows);
    }

    pub fn fail_list_for(&self, kind: EntityKind) {
        self.fail_list.lock().unwrap().insert(kind);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn created_rows(&self) -> Vec<(EntityKind, Value)> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated_rows(&self) -> Vec<(EntityKind, String, Value)> {
        self.updated.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.created.lock().unwrap().len() + self.updated.lock().unwrap().len()
    }

    /// Pushes a change notice through the feed opened for its kind.
    pub async fn push_notice(&self, notice: ChangeNotice) {
        let tx = self
            .feeds
            .lock()
            .unwrap()
            .get(&notice.kind)
            .cloned()
            .expect("no subscription open for kind");
        tx.send(notice).await.expect("notice channel closed");
    }
}

#[async_trait]
impl RemoteDataService for MockRemote {
    async fn list(&self, kind: EntityKind, _filter: &SubscriptionFilter) -> SyncResult<Vec<Value>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.lock().unwrap().contains(&kind) {
            return Err(SyncError::Remote(format!("list {kind} unavailable")));
        }
        Ok(self.rows.lock().unwrap().get(&kind).cloned().unwrap_or_default())
    }

    async fn create(&self, kind: EntityKind, payload: &Value) -> SyncResult<Value> {
        if *self.fail_writes.lock().unwrap() {
            return Err(SyncError::Remote("create unavailable".to_string()));
        }
        self.created.lock().unwrap().push((kind, payload.clone()));
        // Server issues an ID on create
        let mut row = payload.clone();
        if let Some(map) = row.as_object_mut() {
            map.insert("id".to_string(), Value::String(format!("srv-{kind}")));
        }
        Ok(row)
    }

    async fn update(&self, kind: EntityKind, id: &str, payload: &Value) -> SyncResult<Value> {
        if *self.fail_writes.lock().unwrap() {
            return Err(SyncError::Remote("update unavailable".to_string()));
        }
        self.updated
            .lock()
            .unwrap()
            .push((kind, id.to_string(), payload.clone()));
        Ok(payload.clone())
    }

    async fn subscribe(
        &self,
        kind: EntityKind,
        filter: SubscriptionFilter,
        notices: mpsc::Sender<ChangeNotice>,
    ) -> SyncResult<SubscriptionHandle> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.feeds.lock().unwrap().insert(kind, notices);
        Ok(SubscriptionHandle::new(kind, filter))
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> SyncResult<()> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.feeds.lock().unwrap().remove(&handle.kind);
        Ok(())
    }
}
