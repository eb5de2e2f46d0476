use restdeck_sync::{
    ChangeType, RemoteDataService, RestDataService, SubscriptionFilter, SyncConfig, SyncError,
};
use restdeck_types::EntityKind;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> RestDataService {
    RestDataService::new(&SyncConfig {
        api_base_url: server.uri(),
        api_key: "test-key".to_string(),
        feed_poll_interval_ms: 25,
        ..Default::default()
    })
}

#[tokio::test]
async fn list_applies_the_owner_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .and(query_param("select", "*"))
        .and(query_param("owner_id", "eq.user-1"))
        .and(header("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "c-1", "name": "Mine"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let rows = svc
        .list(EntityKind::Collection, &SubscriptionFilter::owned_by("user-1"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "c-1");
}

#[tokio::test]
async fn list_without_filter_hits_the_bare_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/teams"))
        .and(query_param("select", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let rows = svc
        .list(EntityKind::Team, &SubscriptionFilter::unfiltered())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn create_returns_the_representation_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/requests"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"id": "r-42", "name": "draft"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let row = svc
        .create(EntityKind::Request, &json!({"name": "draft"}))
        .await
        .unwrap();
    assert_eq!(row["id"], "r-42");
}

#[tokio::test]
async fn create_with_empty_representation_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/requests"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let err = svc
        .create(EntityKind::Request, &json!({"name": "draft"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote(msg) if msg.contains("returned no row")));
}

#[tokio::test]
async fn update_patches_the_row_matched_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/requests"))
        .and(query_param("id", "eq.r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r-1", "name": "renamed"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let row = svc
        .update(EntityKind::Request, "r-1", &json!({"name": "renamed"}))
        .await
        .unwrap();
    assert_eq!(row["name"], "renamed");
}

#[tokio::test]
async fn update_matching_nothing_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let err = svc
        .update(EntityKind::Team, "t-404", &json!({"name": "ghost"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote(msg) if msg.contains("matched no row")));
}

#[tokio::test]
async fn server_failure_surfaces_as_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let err = svc
        .list(EntityKind::Collection, &SubscriptionFilter::unfiltered())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote(_)));
}

#[tokio::test]
async fn feed_reports_new_rows_and_bumped_timestamps() {
    let server = MockServer::start().await;

    // First poll primes the seen set; nothing is reported for a-1.
    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "updated_at": "2026-03-01T00:00:00Z"}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // Second poll: b-2 appears.
    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "updated_at": "2026-03-01T00:00:00Z"},
            {"id": "b-2", "updated_at": "2026-03-01T00:01:00Z"}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // Later polls: a-1 was edited.
    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "updated_at": "2026-03-01T00:02:00Z"},
            {"id": "b-2", "updated_at": "2026-03-01T00:01:00Z"}
        ])))
        .mount(&server)
        .await;

    let svc = service_for(&server);
    let (tx, mut rx) = mpsc::channel(16);
    let handle = svc
        .subscribe(EntityKind::Collection, SubscriptionFilter::unfiltered(), tx)
        .await
        .unwrap();

    let first = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for insert")
        .unwrap();
    assert_eq!(first.change_type, ChangeType::Insert);
    assert_eq!(first.new_record.as_ref().unwrap()["id"], "b-2");

    let second = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for update")
        .unwrap();
    assert_eq!(second.change_type, ChangeType::Update);
    assert_eq!(second.new_record.as_ref().unwrap()["id"], "a-1");

    svc.unsubscribe(handle).await.unwrap();
}
