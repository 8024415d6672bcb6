//! Core entity structs: alerts, log events, and the system state snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EventType, Severity};
use crate::event_log::EventLog;
use crate::ids::{AlertId, EventId};

/// Message recorded as the first log entry of every run.
pub const SYSTEM_INITIALIZED: &str = "System initialized";

/// An outstanding alert raised by a threshold crossing.
///
/// Alerts never expire. They leave the system only when dismissed
/// individually or cleared in bulk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Human-readable message.
    pub message: String,
    /// How serious the crossing was.
    pub level: Severity,
    /// When the alert was raised.
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Create an alert stamped with a fresh ID and the current time.
    pub fn new(level: Severity, message: String) -> Self {
        Self {
            id: AlertId::new(),
            message,
            level,
            timestamp: Utc::now(),
        }
    }
}

/// A single entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// What kind of occurrence this entry records.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Human-readable message.
    pub message: String,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// How serious the occurrence was.
    pub severity: Severity,
}

impl LogEvent {
    /// Create a log entry stamped with a fresh ID and the current time.
    pub fn new(event_type: EventType, severity: Severity, message: String) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            message,
            timestamp: Utc::now(),
            severity,
        }
    }
}

/// Complete state of the monitored system at one instant.
///
/// The store never edits a published `SystemState` in place: every
/// mutation builds a new value, so consumers holding an older snapshot
/// keep seeing a consistent picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemState {
    /// Whether the light barrier is armed. Contamination is only sampled
    /// while armed.
    pub barrier_active: bool,
    /// Contamination percentage in `[0, 100]` with one decimal digit.
    #[ts(as = "String")]
    pub contamination_level: Decimal,
    /// Outstanding alerts, oldest first.
    pub alerts: Vec<Alert>,
    /// Event history, newest first, bounded.
    #[ts(as = "Vec<LogEvent>")]
    pub events: EventLog,
    /// Number of simulation ticks applied while armed.
    pub tick: u64,
}

impl SystemState {
    /// Build the start-of-process state: barrier armed, the given seed
    /// level, no alerts, and a single initialization entry in the log.
    pub fn initial(contamination_level: Decimal) -> Self {
        let mut events = EventLog::new();
        events.push(LogEvent::new(
            EventType::System,
            Severity::Info,
            SYSTEM_INITIALIZED.to_owned(),
        ));
        Self {
            barrier_active: true,
            contamination_level,
            alerts: Vec::new(),
            events,
            tick: 0,
        }
    }

    /// Look up an outstanding alert by ID.
    pub fn alert(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_armed_with_one_system_event() {
        let state = SystemState::initial(Decimal::new(125, 1));
        assert!(state.barrier_active);
        assert_eq!(state.contamination_level, Decimal::new(125, 1));
        assert!(state.alerts.is_empty());
        assert_eq!(state.events.len(), 1);
        let first = state.events.latest();
        assert_eq!(first.map(|e| e.event_type), Some(EventType::System));
        assert_eq!(first.map(|e| e.message.as_str()), Some(SYSTEM_INITIALIZED));
    }

    #[test]
    fn log_event_serializes_type_field() {
        let event = LogEvent::new(EventType::Alert, Severity::Warning, "x".to_owned());
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "alert");
        assert_eq!(json["severity"], "warning");
    }

    #[test]
    fn contamination_level_serializes_as_decimal_string() {
        let state = SystemState::initial(Decimal::new(125, 1));
        let json = serde_json::to_value(&state).unwrap_or_default();
        assert_eq!(json["contamination_level"], "12.5");
        assert_eq!(json["events"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn alert_lookup_by_id() {
        let mut state = SystemState::initial(Decimal::ZERO);
        let alert = Alert::new(Severity::Critical, "boom".to_owned());
        let id = alert.id;
        state.alerts.push(alert);
        assert_eq!(state.alert(id).map(|a| a.level), Some(Severity::Critical));
        assert!(state.alert(AlertId::new()).is_none());
    }
}
