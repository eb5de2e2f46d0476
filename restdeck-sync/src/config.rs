//! Sync service configuration.

use crate::conflict::ConflictStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the sync service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL for the RestDeck backend (e.g., "https://api.restdeck.app").
    pub api_base_url: String,

    /// Project API key sent on every request.
    pub api_key: String,

    /// Quiet period before a queued auto-save batch is flushed. Each new
    /// save resets the timer (trailing-edge debounce).
    pub debounce_ms: u64,

    /// Poll cadence of the HTTP change feed.
    pub feed_poll_interval_ms: u64,

    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,

    /// Strategy applied when a change-feed echo collides with a pending
    /// local payload. Remote wins by default.
    #[serde(default)]
    pub conflict_strategy: ConflictStrategy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.restdeck.app".to_string(),
            api_key: String::new(),
            debounce_ms: 2000,
            feed_poll_interval_ms: 5000,
            request_timeout_secs: 30,
            conflict_strategy: ConflictStrategy::default(),
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn feed_poll_interval(&self) -> Duration {
        Duration::from_millis(self.feed_poll_interval_ms)
    }
}
