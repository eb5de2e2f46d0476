//! Domain events emitted by the sync core.
//!
//! One tagged variant per named event, each carrying a precisely typed
//! payload. View managers subscribe to the broadcast stream and pick the
//! variants they care about; `name()` yields the wire-style event name for
//! bridging to the renderer.

use crate::model::{ApiRequest, Collection, Team, TeamMember};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum DomainEvent {
    #[serde(rename = "sync-enabled")]
    SyncEnabled,
    #[serde(rename = "sync-disabled")]
    SyncDisabled,
    #[serde(rename = "sync-completed")]
    SyncCompleted { completed_at: DateTime<Utc> },
    #[serde(rename = "sync-error")]
    SyncError { message: String },
    #[serde(rename = "connection-restored")]
    ConnectionRestored,
    #[serde(rename = "connection-lost")]
    ConnectionLost,

    #[serde(rename = "collectionCreated")]
    CollectionCreated { record: Collection },
    #[serde(rename = "collectionUpdated")]
    CollectionUpdated { record: Collection },
    #[serde(rename = "collectionDeleted")]
    CollectionDeleted { record: Collection },

    #[serde(rename = "requestCreated")]
    RequestCreated { record: ApiRequest },
    #[serde(rename = "requestUpdated")]
    RequestUpdated { record: ApiRequest },
    #[serde(rename = "requestDeleted")]
    RequestDeleted { record: ApiRequest },

    #[serde(rename = "teamCreated")]
    TeamCreated { record: Team },
    #[serde(rename = "teamUpdated")]
    TeamUpdated { record: Team },
    #[serde(rename = "teamDeleted")]
    TeamDeleted { record: Team },

    #[serde(rename = "teamMemberCreated")]
    TeamMemberCreated { record: TeamMember },
    #[serde(rename = "teamMemberUpdated")]
    TeamMemberUpdated { record: TeamMember },
    #[serde(rename = "teamMemberDeleted")]
    TeamMemberDeleted { record: TeamMember },
}

impl DomainEvent {
    /// Wire-style event name as seen by the renderer.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::SyncEnabled => "sync-enabled",
            DomainEvent::SyncDisabled => "sync-disabled",
            DomainEvent::SyncCompleted { .. } => "sync-completed",
            DomainEvent::SyncError { .. } => "sync-error",
            DomainEvent::ConnectionRestored => "connection-restored",
            DomainEvent::ConnectionLost => "connection-lost",
            DomainEvent::CollectionCreated { .. } => "collectionCreated",
            DomainEvent::CollectionUpdated { .. } => "collectionUpdated",
            DomainEvent::CollectionDeleted { .. } => "collectionDeleted",
            DomainEvent::RequestCreated { .. } => "requestCreated",
            DomainEvent::RequestUpdated { .. } => "requestUpdated",
            DomainEvent::RequestDeleted { .. } => "requestDeleted",
            DomainEvent::TeamCreated { .. } => "teamCreated",
            DomainEvent::TeamUpdated { .. } => "teamUpdated",
            DomainEvent::TeamDeleted { .. } => "teamDeleted",
            DomainEvent::TeamMemberCreated { .. } => "teamMemberCreated",
            DomainEvent::TeamMemberUpdated { .. } => "teamMemberUpdated",
            DomainEvent::TeamMemberDeleted { .. } => "teamMemberDeleted",
        }
    }
}
