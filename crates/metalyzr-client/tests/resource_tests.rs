//! Integration tests for typed resources
//!
//! Tests cover:
//! - Auto-fetch on activation and the loading -> success transition
//! - Recovery from dropped connections within the retry budget
//! - Error state after a terminal failure and recovery via refetch
//! - Callback injection
//! - Polling and its cancellation on deactivation

mod common;

use common::*;
use metalyzr_client::{ErrorKind, OperationStatus, RequestDescriptor, Resource, ResourceOptions};
use metalyzr_core::types::Stats;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stats_resource(server: &MockServer, options: ResourceOptions<Stats>) -> Resource<Stats> {
    Resource::new(
        Arc::new(test_executor(&server.uri(), 1, 10)),
        metalyzr_client::api::endpoints::stats(),
        options,
    )
}

#[tokio::test]
async fn test_auto_fetch_populates_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(stats_json())
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let resource = stats_resource(&server, ResourceOptions::new());
    let mut states = resource.subscribe();
    assert_eq!(resource.state().status(), OperationStatus::Idle);

    resource.activate();
    let loading = states.wait_for(|state| !state.is_idle()).await.unwrap().clone();
    assert_eq!(loading.status(), OperationStatus::Loading);
    assert!(resource.view().loading);

    states.wait_for(|state| state.is_success()).await.unwrap();

    let view = resource.view();
    assert!(view.is_success);
    assert!(!view.loading);
    assert!(view.error.is_none());
    assert_eq!(view.data.unwrap().archetypes, 15);
}

#[tokio::test]
async fn test_without_auto_fetch_nothing_happens() {
    let server = MockServer::start().await;
    mock_json(&server, "/api/stats", stats_json()).await;

    let resource = stats_resource(&server, ResourceOptions::new().auto_fetch(false));
    resource.activate();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(resource.state().status(), OperationStatus::Idle);
    assert_eq!(request_count(&server, "/api/stats").await, 0);
}

#[tokio::test]
async fn test_error_then_refetch_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Not found", "code": "NOT_FOUND"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mock_json(&server, "/api/stats", stats_json()).await;

    let resource = stats_resource(&server, ResourceOptions::new().auto_fetch(false));

    let err = resource.refetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Http);
    let view = resource.view();
    assert!(view.is_error);
    assert!(view.data.is_none());
    assert_eq!(view.error.unwrap().code(), Some("NOT_FOUND"));

    let stats = resource.refetch().await.unwrap();
    assert_eq!(stats.tournaments, 42);
    let view = resource.view();
    assert!(view.is_success);
    assert!(view.error.is_none());
}

#[tokio::test]
async fn test_callbacks_are_invoked() {
    let server = MockServer::start().await;
    mock_json(&server, "/api/stats", stats_json()).await;

    let successes = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&successes);
    let resource = stats_resource(
        &server,
        ResourceOptions::new()
            .auto_fetch(false)
            .on_success(move |stats: &Stats| {
                assert_eq!(stats.decks, 358);
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .on_error(|e| panic!("unexpected error: {}", e)),
    );

    resource.refetch().await.unwrap();
    resource.refetch().await.unwrap();
    assert_eq!(successes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_polling_refetches_until_deactivated() {
    let server = MockServer::start().await;
    mock_json(&server, "/api/stats", stats_json()).await;

    let resource = stats_resource(
        &server,
        ResourceOptions::new()
            .auto_fetch(false)
            .refresh_every(Duration::from_millis(40)),
    );
    resource.activate();
    assert!(resource.is_polling());

    tokio::time::sleep(Duration::from_millis(190)).await;
    let polled = request_count(&server, "/api/stats").await;
    assert!(polled >= 2, "only {} polls", polled);

    resource.deactivate();
    assert!(!resource.is_polling());
    tokio::time::sleep(Duration::from_millis(50)).await;
    let after_stop = request_count(&server, "/api/stats").await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(request_count(&server, "/api/stats").await, after_stop);
}

#[tokio::test]
async fn test_response_after_deactivation_is_discarded() {
    let server = MockServer::start().await;
    mock_slow(&server, "/api/stats", 150).await;

    let resource = stats_resource(&server, ResourceOptions::new());
    let mut states = resource.subscribe();
    resource.activate();
    states.wait_for(|state| state.is_loading()).await.unwrap();

    resource.deactivate();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let state = resource.state();
    assert!(state.data().is_none());
    assert!(!state.is_success());
}

#[tokio::test]
async fn test_dropped_connections_recover_within_budget() {
    let server = FlakyServer::start(2, r#"{"success":true}"#).await;

    let resource: Resource<Value> = Resource::new(
        Arc::new(test_executor(&server.base_url, 3, 10)),
        RequestDescriptor::get("/api/sync"),
        ResourceOptions::new().auto_fetch(false),
    );

    let body = resource.refetch().await.unwrap();
    assert_eq!(body, json!({"success": true}));

    let view = resource.view();
    assert!(view.is_success);
    assert!(!view.is_error);
    assert_eq!(view.data, Some(json!({"success": true})));
    assert_eq!(server.connections(), 3);
}

#[tokio::test]
async fn test_deactivate_mid_fetch_clears_loading() {
    let server = MockServer::start().await;
    mock_slow(&server, "/api/stats", 150).await;

    let resource = stats_resource(&server, ResourceOptions::new());
    let mut states = resource.subscribe();
    resource.activate();
    states.wait_for(|state| state.is_loading()).await.unwrap();

    resource.deactivate();
    assert!(resource.state().is_idle());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(resource.state().is_idle());
    assert!(!resource.view().loading);
}
