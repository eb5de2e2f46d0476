//! Sync error types.
//!
//! Internal failures never escape the public service operations; they are
//! logged and reflected through status objects and `sync-error` events.
//! The only error a `SyncHandle` caller can see is `ChannelClosed`.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transient network/service failure during list/create/update/subscribe.
    /// Recovered by re-queueing; never fatal.
    #[error("remote operation failed: {0}")]
    Remote(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] restdeck_storage::StorageError),

    #[error("sync service not running")]
    ChannelClosed,

    #[error("invalid configuration: {0}")]
    Config(String),
}
