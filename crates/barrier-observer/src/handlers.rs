//! REST API endpoint handlers for the Observer server.
//!
//! Reads are served from a store snapshot taken at the start of each
//! request. Control endpoints call into [`barrier_core::control`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/state` | Current snapshot with band and thresholds |
//! | `GET` | `/api/thresholds` | Threshold boundaries |
//! | `GET` | `/api/alerts` | Outstanding alerts |
//! | `DELETE` | `/api/alerts` | Clear every alert |
//! | `DELETE` | `/api/alerts/{id}` | Dismiss one alert |
//! | `GET` | `/api/events` | Query the event log (by type or severity) |
//! | `POST` | `/api/barrier/toggle` | Arm or disarm the barrier |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use barrier_core::control;
use barrier_types::{AlertId, EventType, LogEvent, Severity};

use crate::error::ObserverError;
use crate::state::{AppState, StateView};

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Filter by event type (`status_change`, `contamination`, `alert`,
    /// `system`).
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Filter by severity (`info`, `warning`, `critical`).
    pub severity: Option<String>,
    /// Maximum number of events to return (default and cap: the log bound).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET /api/state
// ---------------------------------------------------------------------------

/// Return the current snapshot, its display band, and the thresholds.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.store.snapshot();
    let view = StateView::new(&snapshot, &state.policy);
    Ok(Json(serde_json::to_value(view)?))
}

// ---------------------------------------------------------------------------
// GET /api/thresholds
// ---------------------------------------------------------------------------

/// Return the threshold boundaries the engine runs with.
pub async fn get_thresholds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.policy)
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// List outstanding alerts in the order they were raised.
pub async fn list_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    Json(serde_json::json!({
        "count": snapshot.alerts.len(),
        "alerts": snapshot.alerts,
    }))
}

/// Dismiss a single alert. An unknown ID is not an error; the response
/// reports `removed: false`.
pub async fn dismiss_alert(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id: AlertId = raw
        .parse()
        .map_err(|e| ObserverError::InvalidId(format!("{raw}: {e}")))?;
    let removed = control::dismiss_alert(&state.store, id);
    Ok(Json(serde_json::json!({
        "id": id,
        "removed": removed,
    })))
}

/// Clear every outstanding alert.
pub async fn clear_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cleared = control::clear_all_alerts(&state.store);
    Json(serde_json::json!({ "cleared": cleared }))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// Query the event log, newest first.
///
/// # Query Parameters
///
/// - `type`: only events of this type
/// - `severity`: only events of this severity
/// - `limit`: at most this many events (default and maximum 100)
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Query(params) = query.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;

    let type_filter = params
        .event_type
        .as_deref()
        .map(|name| {
            EventType::from_name(name)
                .ok_or_else(|| ObserverError::InvalidQuery(format!("unknown event type: {name}")))
        })
        .transpose()?;
    let severity_filter = params
        .severity
        .as_deref()
        .map(|name| {
            Severity::from_name(name)
                .ok_or_else(|| ObserverError::InvalidQuery(format!("unknown severity: {name}")))
        })
        .transpose()?;
    let snapshot = state.store.snapshot();
    let bound = snapshot.events.limit();
    let limit = params.limit.map_or(bound, |n| n.min(bound));
    let events: Vec<&LogEvent> = snapshot
        .events
        .iter()
        .filter(|e| type_filter.is_none_or(|t| e.event_type == t))
        .filter(|e| severity_filter.is_none_or(|s| e.severity == s))
        .take(limit)
        .collect();

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/barrier/toggle
// ---------------------------------------------------------------------------

/// Arm or disarm the light barrier. Returns the new armed state.
pub async fn toggle_barrier(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active = control::toggle_barrier(&state.store);
    Json(serde_json::json!({ "barrier_active": active }))
}
