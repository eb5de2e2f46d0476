//! Sync core for RestDeck.
//!
//! Coordinates local state with the remote backend:
//! - Debounced auto-save queue with last-write coalescing per (kind, id)
//! - Full resync writing per-kind backup snapshots to local storage
//! - Change-feed dispatch into typed domain events and view refresh hooks
//! - Last-write-wins conflict resolution with a field-level merge option
//!
//! Everything runs on one logical thread of control: `SyncService` owns the
//! coordinator state and the rest of the application talks to it through
//! `SyncHandle`.

pub mod auth;
pub mod config;
pub mod conflict;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod queue;
pub mod remote;
pub mod rest_client;
pub mod service;

pub use auth::{AuthContext, SessionAuth};
pub use config::SyncConfig;
pub use conflict::{resolve_conflict, ConflictStrategy};
pub use coordinator::{SyncCoordinator, SyncStatus};
pub use dispatch::{ChangeFeedDispatcher, ViewRefresh};
pub use error::{SyncError, SyncResult};
pub use queue::{SaveQueue, SyncQueueItem};
pub use remote::{
    ChangeNotice, ChangeType, RemoteDataService, SubscriptionFilter, SubscriptionHandle,
};
pub use rest_client::RestDataService;
pub use service::{create_sync_service, SyncHandle, SyncService};
