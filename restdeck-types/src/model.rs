//! Tracked entity kinds and their record types.
//!
//! Records mirror the remote table rows. Non-identity fields take serde
//! defaults so that partial rows (e.g. delete notices carrying only an
//! `id`) still deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sentinel ID for a local-only entity that has not been written back yet.
/// The first successful create replaces it with the server-issued ID.
pub const NEW_ENTITY_ID: &str = "new";

/// One of the tracked record categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Collection,
    Request,
    Team,
    TeamMember,
}

impl EntityKind {
    /// All tracked kinds, in resync order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Collection,
        EntityKind::Request,
        EntityKind::Team,
        EntityKind::TeamMember,
    ];

    /// Event-name prefix (`"collectionCreated"`, `"teamMemberDeleted"`, …).
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Collection => "collection",
            EntityKind::Request => "request",
            EntityKind::Team => "team",
            EntityKind::TeamMember => "teamMember",
        }
    }

    /// Remote table name.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Collection => "collections",
            EntityKind::Request => "requests",
            EntityKind::Team => "teams",
            EntityKind::TeamMember => "team_members",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKind(String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collection" | "collections" => Ok(EntityKind::Collection),
            "request" | "requests" => Ok(EntityKind::Request),
            "team" | "teams" => Ok(EntityKind::Team),
            "teamMember" | "team_member" | "team_members" => Ok(EntityKind::TeamMember),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// A request collection owned by a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub request_ids: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// A saved API request definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub id: String,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub url: String,
    /// Header map as stored remotely; shape is backend-defined.
    #[serde(default)]
    pub headers: serde_json::Value,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// A team workspace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Membership of a user in a team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: TeamRole,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Role of a member within a team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Owner,
    Admin,
    #[default]
    Member,
}
