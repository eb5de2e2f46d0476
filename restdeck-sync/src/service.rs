//! Sync service — actor loop and public handle.
//!
//! All coordinator state lives on one task; views and the application
//! shell talk to it through `SyncHandle`. Suspension points are the remote
//! calls and the debounce deadline. A flush that is in flight is never
//! interleaved with command processing, so an auto-save arriving
//! mid-flush lands in the next cycle by construction. Disabling sync does
//! not abort a flush already in flight — an accepted, documented
//! inconsistency window.

use crate::auth::AuthContext;
use crate::config::SyncConfig;
use crate::coordinator::{SyncCoordinator, SyncStatus};
use crate::dispatch::{ChangeFeedDispatcher, ViewRefresh};
use crate::error::{SyncError, SyncResult};
use crate::queue::SyncQueueItem;
use crate::remote::{ChangeNotice, RemoteDataService};
use chrono::{DateTime, Utc};
use restdeck_storage::KvStore;
use restdeck_types::{DomainEvent, EntityKind};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tracing::info;

/// Commands accepted by the sync service.
pub enum SyncCommand {
    EnableSync,
    DisableSync,
    QueueAutoSave {
        kind: EntityKind,
        id: String,
        payload: Value,
    },
    CancelAutoSave,
    ForceSync,
    SignedIn,
    SignedOut,
    Online,
    Offline,
    RegisterView {
        view: Arc<dyn ViewRefresh>,
    },
    GetStatus {
        reply: oneshot::Sender<SyncStatus>,
    },
    GetPendingChanges {
        reply: oneshot::Sender<Vec<SyncQueueItem>>,
    },
    Shutdown,
}

/// Clonable handle for sending commands to the sync service.
#[derive(Clone)]
pub struct SyncHandle {
    command_tx: mpsc::Sender<SyncCommand>,
}

impl SyncHandle {
    async fn send(&self, cmd: SyncCommand) -> SyncResult<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| SyncError::ChannelClosed)
    }

    pub async fn enable_sync(&self) -> SyncResult<()> {
        self.send(SyncCommand::EnableSync).await
    }

    pub async fn disable_sync(&self) -> SyncResult<()> {
        self.send(SyncCommand::DisableSync).await
    }

    /// Coalesces a local mutation and re-arms the debounce timer.
    pub async fn queue_auto_save(
        &self,
        kind: EntityKind,
        id: impl Into<String>,
        payload: Value,
    ) -> SyncResult<()> {
        self.send(SyncCommand::QueueAutoSave {
            kind,
            id: id.into(),
            payload,
        })
        .await
    }

    pub async fn cancel_auto_save(&self) -> SyncResult<()> {
        self.send(SyncCommand::CancelAutoSave).await
    }

    /// Flushes the queue immediately and runs a full resync.
    pub async fn force_sync_now(&self) -> SyncResult<()> {
        self.send(SyncCommand::ForceSync).await
    }

    /// Sign-in notification from the auth layer; enables sync.
    pub async fn signed_in(&self) -> SyncResult<()> {
        self.send(SyncCommand::SignedIn).await
    }

    /// Sign-out notification from the auth layer; disables sync.
    pub async fn signed_out(&self) -> SyncResult<()> {
        self.send(SyncCommand::SignedOut).await
    }

    pub async fn set_online(&self) -> SyncResult<()> {
        self.send(SyncCommand::Online).await
    }

    pub async fn set_offline(&self) -> SyncResult<()> {
        self.send(SyncCommand::Offline).await
    }

    pub async fn register_view(&self, view: Arc<dyn ViewRefresh>) -> SyncResult<()> {
        self.send(SyncCommand::RegisterView { view }).await
    }

    pub async fn status(&self) -> SyncResult<SyncStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(SyncCommand::GetStatus { reply }).await?;
        rx.await.map_err(|_| SyncError::ChannelClosed)
    }

    pub async fn pending_changes(&self) -> SyncResult<Vec<SyncQueueItem>> {
        let (reply, rx) = oneshot::channel();
        self.send(SyncCommand::GetPendingChanges { reply }).await?;
        rx.await.map_err(|_| SyncError::ChannelClosed)
    }

    pub async fn is_sync_enabled(&self) -> SyncResult<bool> {
        Ok(self.status().await?.enabled)
    }

    pub async fn last_sync_time(&self) -> SyncResult<Option<DateTime<Utc>>> {
        Ok(self.status().await?.last_sync_at)
    }

    pub async fn shutdown(&self) -> SyncResult<()> {
        self.send(SyncCommand::Shutdown).await
    }
}

/// The sync service actor.
pub struct SyncService {
    coordinator: SyncCoordinator,
    dispatcher: ChangeFeedDispatcher,
    command_rx: mpsc::Receiver<SyncCommand>,
    notice_rx: mpsc::Receiver<ChangeNotice>,
    notice_tx: mpsc::Sender<ChangeNotice>,
    debounce: Duration,
    flush_deadline: Option<Instant>,
}

/// Composition root: wires the coordinator and dispatcher to their
/// collaborators and returns the handle, the domain-event stream, and the
/// service to spawn.
pub fn create_sync_service(
    auth: Arc<dyn AuthContext>,
    remote: Arc<dyn RemoteDataService>,
    store: Arc<dyn KvStore>,
    config: &SyncConfig,
) -> (SyncHandle, broadcast::Receiver<DomainEvent>, SyncService) {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (notice_tx, notice_rx) = mpsc::channel(256);
    let (event_tx, event_rx) = broadcast::channel(256);

    let coordinator =
        SyncCoordinator::new(auth, remote, store, event_tx.clone(), config.conflict_strategy);
    let dispatcher = ChangeFeedDispatcher::new(event_tx);

    let service = SyncService {
        coordinator,
        dispatcher,
        command_rx,
        notice_rx,
        notice_tx,
        debounce: config.debounce(),
        flush_deadline: None,
    };

    (SyncHandle { command_tx }, event_rx, service)
}

impl SyncService {
    /// Runs the service event loop until shutdown.
    pub async fn run(mut self) {
        info!("sync service started");

        loop {
            let deadline = self.flush_deadline;
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd).await {
                                break;
                            }
                        }
                        None => {
                            info!("command channel closed, stopping sync service");
                            break;
                        }
                    }
                }
                Some(notice) = self.notice_rx.recv() => {
                    let notice = self.coordinator.reconcile(notice);
                    self.dispatcher.dispatch(&notice);
                }
                _ = sleep_until_deadline(deadline), if deadline.is_some() => {
                    self.flush_deadline = None;
                    self.coordinator.process_queue().await;
                }
            }
        }

        info!("sync service stopped");
    }

    /// Returns true when the service should stop.
    async fn handle_command(&mut self, cmd: SyncCommand) -> bool {
        match cmd {
            SyncCommand::EnableSync | SyncCommand::SignedIn => {
                self.coordinator.enable_sync(&self.notice_tx).await;
            }
            SyncCommand::DisableSync | SyncCommand::SignedOut => {
                self.coordinator.disable_sync().await;
            }
            SyncCommand::QueueAutoSave { kind, id, payload } => {
                self.coordinator.queue_auto_save(kind, id, payload);
                // Trailing-edge debounce: every call re-arms the timer.
                self.flush_deadline = Some(Instant::now() + self.debounce);
            }
            SyncCommand::CancelAutoSave => {
                self.coordinator.cancel_auto_save();
                self.flush_deadline = None;
            }
            SyncCommand::ForceSync => {
                self.flush_deadline = None;
                self.coordinator.process_queue().await;
                self.coordinator.perform_full_sync().await;
            }
            SyncCommand::Online => self.coordinator.handle_online().await,
            SyncCommand::Offline => self.coordinator.handle_offline(),
            SyncCommand::RegisterView { view } => self.dispatcher.register_view(view),
            SyncCommand::GetStatus { reply } => {
                let _ = reply.send(self.coordinator.status());
            }
            SyncCommand::GetPendingChanges { reply } => {
                let _ = reply.send(self.coordinator.pending_changes());
            }
            SyncCommand::Shutdown => {
                // Flush what we can before stopping.
                self.coordinator.process_queue().await;
                return true;
            }
        }
        false
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
