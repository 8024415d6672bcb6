//! Observer API server for the light barrier monitor.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/state`) streaming every committed
//!   snapshot via [`tokio::sync::broadcast`]
//! - **REST endpoints** for reading the current state, thresholds,
//!   alerts, and the event log
//! - **Control endpoints** for toggling the barrier and dismissing alerts
//!
//! # Architecture
//!
//! The observer holds the shared [`StateStore`] and registers one store
//! subscription whose callback forwards each new snapshot onto a broadcast
//! channel. REST reads take a snapshot, which never blocks the tick for
//! longer than an `Arc` clone. Control endpoints call the
//! [`barrier_core::control`] operations directly.
//!
//! [`StateStore`]: barrier_core::store::StateStore

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, StateView};
