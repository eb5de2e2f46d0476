//! Conflict resolution between local and remote versions of an entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

use crate::error::SyncError;

/// Policy for reconciling a local record with its remote counterpart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Keep the local record, discard the remote one.
    Local,
    /// Keep the remote record, discard the local one.
    #[default]
    Remote,
    /// Field-level reconciliation: the side with the newer `updated_at`
    /// contributes its fields, except identity and creation-time fields.
    Merge,
}

impl FromStr for ConflictStrategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ConflictStrategy::Local),
            "remote" => Ok(ConflictStrategy::Remote),
            "merge" => Ok(ConflictStrategy::Merge),
            other => Err(SyncError::Config(format!(
                "unknown conflict strategy: {other}"
            ))),
        }
    }
}

/// Fields a merge never overwrites.
const PROTECTED_FIELDS: [&str; 2] = ["id", "created_at"];

/// Resolves a conflict between two versions of the same entity.
///
/// Never fails: any unexpected shape during a merge falls back to the
/// remote record unchanged.
pub fn resolve_conflict(local: &Value, remote: &Value, strategy: ConflictStrategy) -> Value {
    match strategy {
        ConflictStrategy::Local => local.clone(),
        ConflictStrategy::Remote => remote.clone(),
        ConflictStrategy::Merge => match merge(local, remote) {
            Some(merged) => merged,
            None => {
                warn!("conflict merge hit an unexpected record shape, keeping remote");
                remote.clone()
            }
        },
    }
}

/// Field-level merge; `None` on any shape the merge cannot handle.
fn merge(local: &Value, remote: &Value) -> Option<Value> {
    let local_map = local.as_object()?;
    let remote_map = remote.as_object()?;
    let local_stamp = local_map.get("updated_at")?.as_str()?;
    let remote_stamp = remote_map.get("updated_at")?.as_str()?;

    // String comparison is only correct while both stamps are "Z"-suffixed
    // UTC ISO-8601; mixed offset formats would misorder here.
    if local_stamp <= remote_stamp {
        return Some(remote.clone());
    }

    let mut merged = remote_map.clone();
    for (field, value) in local_map {
        if PROTECTED_FIELDS.contains(&field.as_str()) {
            continue;
        }
        merged.insert(field.clone(), value.clone());
    }
    Some(Value::Object(merged))
}
