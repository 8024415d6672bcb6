//! Shared type definitions for the light barrier contamination monitor.
//!
//! This crate is the single source of truth for the data model shared by
//! the engine, the observer API, and (via `ts-rs`) the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for alert and event identifiers
//! - [`enums`] -- Severity, event type, and contamination band
//! - [`event_log`] -- Bounded newest-first event history
//! - [`structs`] -- `Alert`, `LogEvent`, and the `SystemState` snapshot

pub mod enums;
pub mod event_log;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ContaminationBand, EventType, Severity};
pub use event_log::{EventLog, MAX_EVENTS};
pub use ids::{AlertId, EventId};
pub use structs::{Alert, LogEvent, SYSTEM_INITIALIZED, SystemState};
