//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /ws/state` -- `WebSocket` snapshot stream
/// - `GET /api/state` -- current snapshot
/// - `GET /api/thresholds` -- threshold boundaries
/// - `GET /api/alerts` -- outstanding alerts
/// - `DELETE /api/alerts` -- clear all alerts
/// - `DELETE /api/alerts/{id}` -- dismiss one alert
/// - `GET /api/events` -- query the event log
/// - `POST /api/barrier/toggle` -- arm or disarm the barrier
///
/// CORS allows any origin so a dashboard served elsewhere can connect.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws/state", get(ws::ws_state))
        // REST API
        .route("/api/state", get(handlers::get_state))
        .route("/api/thresholds", get(handlers::get_thresholds))
        .route(
            "/api/alerts",
            get(handlers::list_alerts).delete(handlers::clear_alerts),
        )
        .route("/api/alerts/{id}", delete(handlers::dismiss_alert))
        .route("/api/events", get(handlers::list_events))
        // Control
        .route("/api/barrier/toggle", post(handlers::toggle_barrier))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
