//! Mock server helpers for Metalyzr endpoints

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STATS_BODY: &str = r#"{"tournaments":42,"archetypes":15,"decks":358}"#;

pub fn stats_json() -> Value {
    json!({"tournaments": 42, "archetypes": 15, "decks": 358})
}

/// GET `route` answers 200 with `body`
pub async fn mock_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// GET `route` always answers `status` with `body`
pub async fn mock_status(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// GET `route` fails with 500 `fail_count` times, then answers 200 with `body`
pub async fn mock_flaky_json(server: &MockServer, route: &str, fail_count: u64, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    mock_json(server, route, body).await;
}

/// GET `route` answers only after `delay_ms`
pub async fn mock_slow(server: &MockServer, route: &str, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(STATS_BODY)
                .set_delay(std::time::Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

/// Number of requests the server has seen on `route`
pub async fn request_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}
