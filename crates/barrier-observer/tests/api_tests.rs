//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use barrier_core::store::StateStore;
use barrier_core::thresholds::ThresholdPolicy;
use barrier_observer::router::build_router;
use barrier_observer::state::AppState;
use barrier_types::{Alert, AlertId, EventType, LogEvent, Severity, SystemState};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    let mut seed = SystemState::initial(Decimal::new(520, 1));
    seed.alerts.push(Alert::new(
        Severity::Warning,
        "WARNING: Contamination level exceeded 50%".to_owned(),
    ));
    seed.alerts.push(Alert::new(
        Severity::Critical,
        "CRITICAL: Contamination level exceeded 75%".to_owned(),
    ));
    seed.events.push(LogEvent::new(
        EventType::Contamination,
        Severity::Warning,
        "Contamination level increased to 52.0%".to_owned(),
    ));
    seed.events.push(LogEvent::new(
        EventType::Alert,
        Severity::Warning,
        "WARNING: Contamination level exceeded 50%".to_owned(),
    ));

    let store = Arc::new(StateStore::new(seed));
    Arc::new(AppState::new(store, ThresholdPolicy::default()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_get_state() {
    let state = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(request(Method::GET, "/api/state"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["barrier_active"], true);
    assert_eq!(json["contamination_level"], "52.0");
    assert_eq!(json["band"], "warning");
    assert_eq!(json["tick"], 0);
    assert_eq!(json["thresholds"]["warning"], "50");
    assert_eq!(json["alerts"].as_array().unwrap().len(), 2);
    // Newest first.
    assert_eq!(json["events"][0]["type"], "alert");
    assert_eq!(json["events"][2]["message"], "System initialized");
}

#[tokio::test]
async fn test_get_thresholds() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/thresholds"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["safe"], "25");
    assert_eq!(json["warning"], "50");
    assert_eq!(json["danger"], "75");
}

#[tokio::test]
async fn test_list_alerts() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/alerts"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["alerts"][0]["level"], "warning");
    assert_eq!(json["alerts"][1]["level"], "critical");
}

#[tokio::test]
async fn test_dismiss_alert() {
    let state = make_test_state();
    let target = state.store.snapshot().alerts.first().map(|a| a.id).unwrap();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(request(Method::DELETE, &format!("/api/alerts/{target}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], true);
    assert_eq!(json["id"], target.to_string());

    let snapshot = state.store.snapshot();
    assert_eq!(snapshot.alerts.len(), 1);
    assert!(snapshot.alert(target).is_none());
}

#[tokio::test]
async fn test_dismiss_unknown_alert_is_ok() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(request(
            Method::DELETE,
            &format!("/api/alerts/{}", AlertId::new()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], false);
    assert_eq!(state.store.snapshot().alerts.len(), 2);
}

#[tokio::test]
async fn test_dismiss_invalid_id() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::DELETE, "/api/alerts/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("not-a-uuid"));
}

#[tokio::test]
async fn test_clear_alerts() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(request(Method::DELETE, "/api/alerts"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cleared"], 2);
    assert!(state.store.snapshot().alerts.is_empty());
}

#[tokio::test]
async fn test_list_events() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/events"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 3);
    assert_eq!(json["events"][0]["type"], "alert");
    assert_eq!(json["events"][1]["type"], "contamination");
    assert_eq!(json["events"][2]["type"], "system");
}

#[tokio::test]
async fn test_list_events_filter_by_type() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/events?type=contamination"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(
        json["events"][0]["message"],
        "Contamination level increased to 52.0%"
    );
}

#[tokio::test]
async fn test_list_events_filter_by_severity_and_limit() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/events?severity=warning&limit=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["events"][0]["type"], "alert");
}

#[tokio::test]
async fn test_list_events_limit_is_capped_at_log_bound() {
    let state = make_test_state();
    for _ in 0..150 {
        let _ = barrier_core::control::toggle_barrier(&state.store);
    }
    let router = build_router(state);
    let response = router
        .oneshot(request(Method::GET, "/api/events?limit=500"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 100);
}

#[tokio::test]
async fn test_list_events_unknown_type() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/events?type=meltdown"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("meltdown"));
}

#[tokio::test]
async fn test_list_events_malformed_limit() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/events?limit=lots"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_toggle_barrier() {
    let state = make_test_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(request(Method::POST, "/api/barrier/toggle"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["barrier_active"], false);

    let snapshot = state.store.snapshot();
    assert!(!snapshot.barrier_active);
    assert_eq!(
        snapshot.events.latest().map(|e| e.message.as_str()),
        Some("Light barrier deactivated")
    );

    let response = build_router(Arc::clone(&state))
        .oneshot(request(Method::POST, "/api/barrier/toggle"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["barrier_active"], true);
}

#[tokio::test]
async fn test_control_changes_reach_broadcast() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    let response = build_router(Arc::clone(&state))
        .oneshot(request(Method::DELETE, "/api/alerts"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let snapshot = rx.recv().await.unwrap();
    assert!(snapshot.alerts.is_empty());
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/barrier/toggle"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let router = build_router(make_test_state());
    let response = router
        .oneshot(request(Method::GET, "/api/nonexistent"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
