//! HTTP implementation of the remote data-service contract.
//!
//! Speaks a Supabase-style table REST API: rows are JSON objects addressed
//! by table name and filtered with `column=eq.value` query parameters. The
//! change feed is poll-based: a background task lists the table on an
//! interval, reporting unseen ids as inserts and bumped `updated_at`
//! values as updates. Row deletions are not observable through polling; a
//! realtime channel backend delivers them through the same notice path.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::{
    ChangeNotice, ChangeType, RemoteDataService, SubscriptionFilter, SubscriptionHandle,
};
use async_trait::async_trait;
use restdeck_types::EntityKind;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// HTTP client for the RestDeck table API.
#[derive(Clone)]
pub struct RestDataService {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
}

impl RestDataService {
    pub fn new(config: &SyncConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            poll_interval: config.feed_poll_interval(),
        }
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    fn remote_err(e: reqwest::Error) -> SyncError {
        SyncError::Remote(e.to_string())
    }
}

#[async_trait]
impl RemoteDataService for RestDataService {
    async fn list(&self, kind: EntityKind, filter: &SubscriptionFilter) -> SyncResult<Vec<Value>> {
        let mut req = self
            .client
            .get(self.table_url(kind))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[("select", "*")]);

        if let Some(owner) = &filter.owner_id {
            req = req.query(&[("owner_id", format!("eq.{owner}"))]);
        }

        let rows = req
            .send()
            .await?
            .error_for_status()
            .map_err(Self::remote_err)?
            .json()
            .await?;
        Ok(rows)
    }

    async fn create(&self, kind: EntityKind, payload: &Value) -> SyncResult<Value> {
        let mut rows: Vec<Value> = self
            .client
            .post(self.table_url(kind))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await?
            .error_for_status()
            .map_err(Self::remote_err)?
            .json()
            .await?;

        rows.pop()
            .ok_or_else(|| SyncError::Remote(format!("create on {} returned no row", kind.table())))
    }

    async fn update(&self, kind: EntityKind, id: &str, payload: &Value) -> SyncResult<Value> {
        let mut rows: Vec<Value> = self
            .client
            .patch(self.table_url(kind))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(payload)
            .send()
            .await?
            .error_for_status()
            .map_err(Self::remote_err)?
            .json()
            .await?;

        rows.pop().ok_or_else(|| {
            SyncError::Remote(format!("update on {} matched no row for id {id}", kind.table()))
        })
    }

    async fn subscribe(
        &self,
        kind: EntityKind,
        filter: SubscriptionFilter,
        notices: mpsc::Sender<ChangeNotice>,
    ) -> SyncResult<SubscriptionHandle> {
        let task = tokio::spawn(poll_feed(self.clone(), kind, filter.clone(), notices));
        Ok(SubscriptionHandle::with_feed_task(kind, filter, task))
    }

    async fn unsubscribe(&self, mut handle: SubscriptionHandle) -> SyncResult<()> {
        handle.abort_feed();
        Ok(())
    }
}

/// Background feed task: lists the table each interval and turns row diffs
/// into change notices. The first pass only primes the seen set so that
/// pre-existing rows are not reported as inserts.
async fn poll_feed(
    svc: RestDataService,
    kind: EntityKind,
    filter: SubscriptionFilter,
    notices: mpsc::Sender<ChangeNotice>,
) {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut primed = false;
    let mut ticker = tokio::time::interval(svc.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if notices.is_closed() {
            debug!("change feed for {kind} lost its consumer, stopping");
            return;
        }

        let rows = match svc.list(kind, &filter).await {
            Ok(rows) => rows,
            Err(e) => {
                debug!("change feed poll failed for {kind}: {e}");
                continue;
            }
        };

        for row in rows {
            let Some(id) = row.get("id").and_then(Value::as_str) else {
                continue;
            };
            let stamp = row
                .get("updated_at")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let change_type = match seen.insert(id.to_string(), stamp.clone()) {
                None if primed => Some(ChangeType::Insert),
                Some(prev) if prev != stamp => Some(ChangeType::Update),
                _ => None,
            };

            if let Some(change_type) = change_type {
                let notice = ChangeNotice {
                    kind,
                    change_type,
                    new_record: Some(row),
                    old_record: None,
                };
                if notices.send(notice).await.is_err() {
                    return;
                }
            }
        }
        primed = true;
    }
}
