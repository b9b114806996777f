//! Integration tests for the retrying request executor
//!
//! Tests cover:
//! - Success on the first attempt
//! - Terminal HTTP statuses (single attempt)
//! - Retry budget exhaustion on retryable statuses
//! - Connection failures followed by success
//! - Per-attempt timeouts and backoff timing
//! - Header merging, query parameters and envelope unwrapping

mod common;

use common::*;
use metalyzr_client::{ErrorKind, RequestDescriptor};
use metalyzr_core::retry::Retryable;
use metalyzr_core::types::Stats;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_stats_success_on_first_attempt() {
    let server = MockServer::start().await;
    mock_json(&server, "/api/stats", stats_json()).await;

    let (executor, counter) = counted_executor(&server.uri(), 3, 10);
    let stats: Stats = executor
        .execute(&RequestDescriptor::get("/api/stats"))
        .await
        .unwrap();

    assert_eq!(
        stats,
        Stats {
            tournaments: 42,
            archetypes: 15,
            decks: 358
        }
    );
    assert_eq!(counter.started(), 1);
    assert_eq!(counter.succeeded(), 1);
}

#[tokio::test]
async fn test_not_found_is_attempted_once() {
    let server = MockServer::start().await;
    mock_status(
        &server,
        "/api/missing",
        404,
        json!({"message": "Not found", "code": "NOT_FOUND"}),
    )
    .await;

    let (executor, counter) = counted_executor(&server.uri(), 5, 10);
    let err = executor
        .execute::<Value>(&RequestDescriptor::get("/api/missing"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.code(), Some("NOT_FOUND"));
    assert_eq!(err.message(), "Not found");
    assert_eq!(counter.started(), 1);
    assert_eq!(counter.rejected(), 1);
    assert_eq!(request_count(&server, "/api/missing").await, 1);
}

#[tokio::test]
async fn test_terminal_statuses_ignore_retry_budget() {
    for status in [400u16, 401, 403, 404] {
        let server = MockServer::start().await;
        mock_status(&server, "/api/stats", status, json!({})).await;

        let executor = test_executor(&server.uri(), 4, 10);
        let err = executor
            .execute::<Value>(&RequestDescriptor::get("/api/stats"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(status));
        assert_eq!(err.message(), format!("HTTP {}", status));
        assert_eq!(request_count(&server, "/api/stats").await, 1);
    }
}

#[tokio::test]
async fn test_retryable_status_uses_whole_budget() {
    for budget in 1..=4u32 {
        let server = MockServer::start().await;
        mock_status(&server, "/api/stats", 503, json!({"detail": "maintenance"})).await;

        let executor = test_executor(&server.uri(), budget, 5);
        let err = executor
            .execute::<Value>(&RequestDescriptor::get("/api/stats"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.message(), "maintenance");
        assert!(err.is_retryable());
        assert_eq!(request_count(&server, "/api/stats").await, budget as usize);
    }
}

#[tokio::test]
async fn test_server_errors_then_success() {
    let server = MockServer::start().await;
    mock_flaky_json(&server, "/api/stats", 2, stats_json()).await;

    let executor = test_executor(&server.uri(), 3, 10);
    let stats: Stats = executor
        .execute(&RequestDescriptor::get("/api/stats"))
        .await
        .unwrap();

    assert_eq!(stats.decks, 358);
    assert_eq!(request_count(&server, "/api/stats").await, 3);
}

#[tokio::test]
async fn test_connection_failures_then_success() {
    let server = FlakyServer::start(2, r#"{"success":true}"#).await;

    let (executor, counter) = counted_executor(&server.base_url, 3, 10);
    let body: Value = executor
        .execute(&RequestDescriptor::get("/api/sync"))
        .await
        .unwrap();

    assert_eq!(body, json!({"success": true}));
    assert_eq!(counter.started(), 3);
    assert_eq!(counter.retried(), 2);
    assert_eq!(server.connections(), 3);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let base_url = refused_base_url().await;

    let (executor, counter) = counted_executor(&base_url, 2, 5);
    let err = executor
        .execute::<Value>(&RequestDescriptor::get("/health"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status_code(), None);
    assert_eq!(counter.started(), 2);
    assert_eq!(counter.exhausted(), 1);
}

#[tokio::test]
async fn test_timeouts_are_retried_until_budget() {
    let server = MockServer::start().await;
    mock_slow(&server, "/api/stats", 2_000).await;

    let (executor, counter) = counted_executor(&server.uri(), 3, 10);
    let request = RequestDescriptor::get("/api/stats")
        .max_attempts(2)
        .base_delay(Duration::from_millis(100))
        .timeout(Duration::from_millis(50));

    let started = Instant::now();
    let err = executor.execute::<Stats>(&request).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(elapsed >= Duration::from_millis(100), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2_000), "elapsed {:?}", elapsed);
    assert_eq!(counter.started(), 2);
}

#[tokio::test]
async fn test_attempt_override_keeps_executor_backoff() {
    let server = MockServer::start().await;
    mock_status(&server, "/api/stats", 500, json!({})).await;

    let (executor, counter) = counted_executor(&server.uri(), 3, 10);
    let request = RequestDescriptor::get("/api/stats").max_attempts(2);

    let started = Instant::now();
    let err = executor.execute::<Value>(&request).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.status_code(), Some(500));
    assert_eq!(counter.started(), 2);
    // One 10ms backoff from the executor policy, not the 1s library default
    assert!(elapsed < Duration::from_millis(500), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_backoff_doubles_between_attempts() {
    let server = MockServer::start().await;
    mock_status(&server, "/api/stats", 500, json!({})).await;

    let executor = test_executor(&server.uri(), 3, 50);
    let started = Instant::now();
    let _ = executor
        .execute::<Value>(&RequestDescriptor::get("/api/stats"))
        .await;

    // 50ms after the first attempt, 100ms after the second
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(request_count(&server, "/api/stats").await, 3);
}

#[tokio::test]
async fn test_parse_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let executor = test_executor(&server.uri(), 3, 10);
    let err = executor
        .execute::<Stats>(&RequestDescriptor::get("/api/stats"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(request_count(&server, "/api/stats").await, 1);
}

#[tokio::test]
async fn test_default_content_type_and_extra_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json()))
        .expect(1)
        .mount(&server)
        .await;

    let executor = test_executor(&server.uri(), 1, 10);
    let request = RequestDescriptor::get("/api/stats")
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
    executor.execute::<Stats>(&request).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn test_caller_content_type_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/archetypes"))
        .and(header("content-type", "application/merge-patch+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = test_executor(&server.uri(), 1, 10);
    let request = RequestDescriptor::post("/api/archetypes")
        .header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/merge-patch+json"),
        )
        .json_body(json!({"name": "Burn"}));
    executor.execute::<Value>(&request).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn test_query_parameters_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tournaments"))
        .and(query_param("format", "Modern"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let executor = test_executor(&server.uri(), 1, 10);
    let request = RequestDescriptor::get("/api/tournaments")
        .query("format", "Modern")
        .query("limit", 5);
    let tournaments: Vec<Value> = executor.execute(&request).await.unwrap();

    assert!(tournaments.is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_envelope_is_unwrapped() {
    let server = MockServer::start().await;
    mock_json(&server, "/api/stats", json!({"data": stats_json()})).await;

    let executor = test_executor(&server.uri(), 1, 10);
    let stats: Stats = executor
        .execute_data(&RequestDescriptor::get("/api/stats"))
        .await
        .unwrap();

    assert_eq!(stats.tournaments, 42);
}

#[tokio::test]
async fn test_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/metagame/update"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let executor = test_executor(&server.uri(), 1, 10);
    executor
        .execute::<()>(&RequestDescriptor::post("/api/metagame/update"))
        .await
        .unwrap();
}
