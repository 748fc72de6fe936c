//! Integration tests for CollectionSync.
//!
//! Uses wiremock for HTTP mocking. Tests cover the joint bootstrap load
//! (success, single failure, transport failure, reload on endpoint change)
//! and the create paths for both collections.

use std::time::Duration;

use serde_json::json;
use servicedeck_core::sync::collections::{
    PRODUCTS_FETCH_FAILED, PRODUCT_CREATE_FAILED, USERS_FETCH_FAILED, USER_CREATE_FAILED,
};
use servicedeck_core::{ApiClient, CollectionSync, Endpoints, LoadState, SyncError};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoints(mock_server: &MockServer) -> Endpoints {
    Endpoints {
        users: format!("{}/users", mock_server.uri()),
        products: format!("{}/products", mock_server.uri()),
        cache_base: mock_server.uri(),
    }
}

fn create_sync(endpoints: Endpoints) -> CollectionSync {
    CollectionSync::new(ApiClient::new(endpoints).expect("failed to create client"))
}

fn users_json() -> serde_json::Value {
    json!([
        {"id": 1, "username": "ada", "email": "ada@example.com", "created_at": "2024-03-01T09:30:00.000001"},
        {"id": 2, "username": "bo", "email": "bo@example.com", "created_at": "2024-03-02T10:00:00"}
    ])
}

fn products_json() -> serde_json::Value {
    json!([
        {"id": 5, "name": "Lamp", "description": "Desk lamp", "price": 19.5, "created_at": "2024-03-01T09:30:00"}
    ])
}

async fn mount_list(mock_server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(mock_server)
        .await;
}

async fn mount_healthy_lists(mock_server: &MockServer) {
    mount_list(mock_server, "/users", ResponseTemplate::new(200).set_body_json(users_json())).await;
    mount_list(mock_server, "/products", ResponseTemplate::new(200).set_body_json(products_json())).await;
}

/// Mount and wait for the bootstrap load to settle
async fn loaded_sync(mock_server: &MockServer) -> CollectionSync {
    let mut sync = create_sync(endpoints(mock_server));
    sync.mount();
    assert!(sync.is_loading());
    assert!(sync.wait_for_update().await);
    sync
}

// -------------------------------------------------------------------------
// Bootstrap
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_bootstrap_adopts_both_collections() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;

    let sync = loaded_sync(&mock_server).await;

    assert_eq!(sync.state(), LoadState::Ready);
    assert!(!sync.is_loading());
    assert_eq!(sync.error(), None);
    assert_eq!(serde_json::to_value(sync.users()).unwrap(), users_json());
    assert_eq!(serde_json::to_value(sync.products()).unwrap(), products_json());
}

#[tokio::test]
async fn test_bootstrap_single_failure_discards_both() {
    let mock_server = MockServer::start().await;
    // Both requests must be made even though one fails
    mount_list(&mock_server, "/users", ResponseTemplate::new(200).set_body_json(users_json())).await;
    mount_list(&mock_server, "/products", ResponseTemplate::new(500)).await;

    let sync = loaded_sync(&mock_server).await;

    assert_eq!(sync.state(), LoadState::LoadFailed);
    assert!(!sync.is_loading());
    assert!(sync.users().is_empty());
    assert!(sync.products().is_empty());
    assert_eq!(sync.error(), Some(PRODUCTS_FETCH_FAILED));
}

#[tokio::test]
async fn test_bootstrap_reports_users_failure_first() {
    let mock_server = MockServer::start().await;
    mount_list(&mock_server, "/users", ResponseTemplate::new(503)).await;
    mount_list(&mock_server, "/products", ResponseTemplate::new(500)).await;

    let sync = loaded_sync(&mock_server).await;

    assert_eq!(sync.state(), LoadState::LoadFailed);
    assert_eq!(sync.error(), Some(USERS_FETCH_FAILED));
}

#[tokio::test]
async fn test_bootstrap_transport_failure_keeps_error_text() {
    let mock_server = MockServer::start().await;
    mount_list(&mock_server, "/products", ResponseTemplate::new(200).set_body_json(products_json())).await;

    let mut sync = create_sync(Endpoints {
        // Nothing listens on port 1
        users: "http://127.0.0.1:1/users".to_string(),
        ..endpoints(&mock_server)
    });
    sync.mount();
    assert!(sync.wait_for_update().await);

    assert_eq!(sync.state(), LoadState::LoadFailed);
    let error = sync.error().expect("expected an aggregate error");
    assert!(!error.is_empty());
    assert_ne!(error, USERS_FETCH_FAILED);
    assert!(sync.products().is_empty());
}

#[tokio::test]
async fn test_bootstrap_malformed_body_fails_load() {
    let mock_server = MockServer::start().await;
    mount_list(&mock_server, "/users", ResponseTemplate::new(200).set_body_string("<html>")).await;
    mount_list(&mock_server, "/products", ResponseTemplate::new(200).set_body_json(products_json())).await;

    let sync = loaded_sync(&mock_server).await;

    assert_eq!(sync.state(), LoadState::LoadFailed);
    assert!(sync.error().unwrap().contains("Failed to parse users"));
    assert!(sync.products().is_empty());
}

#[tokio::test]
async fn test_mount_loads_once() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;

    let mut sync = loaded_sync(&mock_server).await;
    sync.mount();

    assert!(!sync.has_pending());
    assert!(!sync.wait_for_update().await);
}

#[tokio::test]
async fn test_endpoint_change_reloads_and_keeps_prior_state_on_failure() {
    let healthy = MockServer::start().await;
    mount_healthy_lists(&healthy).await;
    let broken = MockServer::start().await;
    mount_list(&broken, "/users", ResponseTemplate::new(500)).await;
    mount_list(&broken, "/products", ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let mut sync = loaded_sync(&healthy).await;
    assert_eq!(sync.users().len(), 2);

    assert!(!sync.set_endpoints(endpoints(&healthy)).expect("valid endpoints"));
    assert!(!sync.has_pending());

    assert!(sync.set_endpoints(endpoints(&broken)).expect("valid endpoints"));
    assert!(sync.is_loading());
    assert!(sync.wait_for_update().await);

    assert_eq!(sync.state(), LoadState::LoadFailed);
    assert_eq!(sync.error(), Some(USERS_FETCH_FAILED));
    assert_eq!(sync.users().len(), 2);
    assert_eq!(sync.products().len(), 1);
}

#[tokio::test]
async fn test_endpoint_change_discards_superseded_load() {
    let slow = MockServer::start().await;
    mount_list(
        &slow,
        "/users",
        ResponseTemplate::new(200)
            .set_body_json(users_json())
            .set_delay(Duration::from_millis(400)),
    )
    .await;
    mount_list(&slow, "/products", ResponseTemplate::new(200).set_body_json(products_json())).await;
    let fast = MockServer::start().await;
    mount_list(&fast, "/users", ResponseTemplate::new(200).set_body_json(json!([]))).await;
    mount_list(&fast, "/products", ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let mut sync = create_sync(endpoints(&slow));
    sync.mount();
    assert!(sync.set_endpoints(endpoints(&fast)).expect("valid endpoints"));

    // Both loads report back; the older one resolves last
    assert!(sync.wait_for_update().await);
    assert!(sync.wait_for_update().await);
    assert!(!sync.has_pending());

    assert_eq!(sync.state(), LoadState::Ready);
    assert!(sync.users().is_empty());
    assert!(sync.products().is_empty());
}

#[tokio::test]
async fn test_endpoint_change_before_mount_does_not_load() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut sync = create_sync(Endpoints::default());
    assert!(sync.set_endpoints(endpoints(&mock_server)).expect("valid endpoints"));
    assert_eq!(sync.state(), LoadState::Idle);
    assert!(!sync.has_pending());
}

// -------------------------------------------------------------------------
// Create
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_create_user_appends_server_record() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;

    let created = json!({"id": 42, "username": "cy", "email": "cy@example.com", "created_at": "2024-03-03T08:00:00"});
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({"username": "cy", "email": "cy@example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut sync = loaded_sync(&mock_server).await;
    sync.user_form.username = "cy".to_string();
    sync.user_form.email = "cy@example.com".to_string();
    sync.submit_user().expect("submit should be accepted");
    assert!(sync.wait_for_update().await);

    assert_eq!(sync.users().len(), 3);
    assert_eq!(serde_json::to_value(sync.users().last().unwrap()).unwrap(), created);
    assert!(sync.user_form.username.is_empty());
    assert!(sync.user_form.email.is_empty());
    assert_eq!(sync.state(), LoadState::Ready);
}

#[tokio::test]
async fn test_create_user_failure_keeps_collection_and_form() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "User already exists"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut sync = loaded_sync(&mock_server).await;
    sync.user_form.username = "ada".to_string();
    sync.user_form.email = "ada@example.com".to_string();
    sync.submit_user().expect("submit should be accepted");
    assert!(sync.wait_for_update().await);

    assert_eq!(sync.users().len(), 2);
    assert_eq!(sync.error(), Some(USER_CREATE_FAILED));
    assert_eq!(sync.user_form.username, "ada");
    assert_eq!(sync.user_form.email, "ada@example.com");
    assert_eq!(sync.state(), LoadState::Ready);
}

#[tokio::test]
async fn test_create_product_sends_numeric_price() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;

    let created = json!({"id": 6, "name": "Chair", "description": "Oak chair", "price": 12.5, "created_at": "2024-03-03T08:00:00"});
    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_json(json!({"name": "Chair", "description": "Oak chair", "price": 12.5})))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut sync = loaded_sync(&mock_server).await;
    sync.product_form.name = "Chair".to_string();
    sync.product_form.description = "Oak chair".to_string();
    sync.product_form.price = "12.50".to_string();
    sync.submit_product().expect("submit should be accepted");
    assert!(sync.wait_for_update().await);

    assert_eq!(sync.products().len(), 2);
    assert_eq!(serde_json::to_value(sync.products().last().unwrap()).unwrap(), created);
    assert!(sync.product_form.price.is_empty());
}

#[tokio::test]
async fn test_create_product_failure_sets_fixed_message() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut sync = loaded_sync(&mock_server).await;
    sync.product_form.name = "Chair".to_string();
    sync.product_form.description = "Oak chair".to_string();
    sync.product_form.price = "3".to_string();
    sync.submit_product().expect("submit should be accepted");
    assert!(sync.wait_for_update().await);

    assert_eq!(sync.products().len(), 1);
    assert_eq!(sync.error(), Some(PRODUCT_CREATE_FAILED));
    assert_eq!(sync.product_form.name, "Chair");
}

#[tokio::test]
async fn test_create_product_invalid_price_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut sync = loaded_sync(&mock_server).await;
    sync.product_form.name = "Chair".to_string();
    sync.product_form.price = "cheap".to_string();

    assert_eq!(
        sync.submit_product(),
        Err(SyncError::InvalidPrice("cheap".to_string()))
    );
    assert!(!sync.has_pending());
}

#[tokio::test]
async fn test_create_rejected_after_failed_load() {
    let mock_server = MockServer::start().await;
    mount_list(&mock_server, "/users", ResponseTemplate::new(500)).await;
    mount_list(&mock_server, "/products", ResponseTemplate::new(500)).await;

    let mut sync = loaded_sync(&mock_server).await;
    sync.user_form.username = "ada".to_string();
    sync.user_form.email = "ada@example.com".to_string();

    assert_eq!(
        sync.submit_user(),
        Err(SyncError::NotReady(LoadState::LoadFailed))
    );
}

#[tokio::test]
async fn test_background_results_drain_without_blocking() {
    let mock_server = MockServer::start().await;
    mount_healthy_lists(&mock_server).await;

    let mut sync = create_sync(endpoints(&mock_server));
    sync.mount();

    let mut applied = 0;
    for _ in 0..200 {
        applied += sync.check_background_tasks();
        if applied > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(applied, 1);
    assert_eq!(sync.state(), LoadState::Ready);
}
