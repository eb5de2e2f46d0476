use pretty_assertions::assert_eq;
use restdeck_sync::{resolve_conflict, ConflictStrategy};
use serde_json::json;

fn local() -> serde_json::Value {
    json!({
        "id": "c-1",
        "name": "local name",
        "description": "edited offline",
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-03-02T10:00:00Z"
    })
}

fn remote() -> serde_json::Value {
    json!({
        "id": "c-1",
        "name": "remote name",
        "owner_id": "user-2",
        "created_at": "2026-02-01T00:00:00Z",
        "updated_at": "2026-03-01T10:00:00Z"
    })
}

#[test]
fn local_strategy_discards_remote() {
    assert_eq!(resolve_conflict(&local(), &remote(), ConflictStrategy::Local), local());
}

#[test]
fn remote_strategy_discards_local() {
    assert_eq!(resolve_conflict(&local(), &remote(), ConflictStrategy::Remote), remote());
}

#[test]
fn merge_with_newer_local_takes_local_fields() {
    let merged = resolve_conflict(&local(), &remote(), ConflictStrategy::Merge);

    assert_eq!(merged["name"], "local name");
    assert_eq!(merged["description"], "edited offline");
    assert_eq!(merged["updated_at"], "2026-03-02T10:00:00Z");
    // Remote-only fields survive the merge
    assert_eq!(merged["owner_id"], "user-2");
}

#[test]
fn merge_never_touches_identity_or_creation_fields() {
    let merged = resolve_conflict(&local(), &remote(), ConflictStrategy::Merge);

    assert_eq!(merged["id"], "c-1");
    assert_eq!(merged["created_at"], "2026-02-01T00:00:00Z");
}

#[test]
fn merge_with_newer_remote_returns_remote_unchanged() {
    let mut stale_local = local();
    stale_local["updated_at"] = json!("2026-02-28T10:00:00Z");

    assert_eq!(
        resolve_conflict(&stale_local, &remote(), ConflictStrategy::Merge),
        remote()
    );
}

#[test]
fn merge_with_equal_timestamps_prefers_remote() {
    let mut tied_local = local();
    tied_local["updated_at"] = remote()["updated_at"].clone();

    assert_eq!(
        resolve_conflict(&tied_local, &remote(), ConflictStrategy::Merge),
        remote()
    );
}

#[test]
fn malformed_local_falls_back_to_remote() {
    let malformed = json!(["not", "an", "object"]);
    assert_eq!(
        resolve_conflict(&malformed, &remote(), ConflictStrategy::Merge),
        remote()
    );
}
