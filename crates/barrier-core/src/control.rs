//! Control surface: imperative operations outside the tick cycle.
//!
//! These write to the [`StateStore`] directly, bypassing the simulation
//! engine. Every call commits exactly one new snapshot and notifies
//! subscribers, even when it changes nothing visible (dismissing an
//! unknown alert). None of them can fail.

use barrier_types::{AlertId, EventType, LogEvent, Severity};
use tracing::info;

use crate::store::StateStore;

/// Arm or disarm the light barrier. Returns the new armed state.
///
/// Always appends one `status_change` entry to the event log.
/// Contamination and alerts are left as they are.
pub fn toggle_barrier(store: &StateStore) -> bool {
    let active = store
        .update(|state| {
            let active = !state.barrier_active;
            let mut next = state.clone();
            next.barrier_active = active;
            next.events.push(LogEvent::new(
                EventType::StatusChange,
                Severity::Info,
                format!(
                    "Light barrier {}",
                    if active { "activated" } else { "deactivated" }
                ),
            ));
            Some((next, active))
        })
        .unwrap_or_default();
    info!(active, "Light barrier toggled");
    active
}

/// Remove one outstanding alert. Returns whether an alert was removed.
///
/// An unknown ID is not an error: the alert list is left unchanged.
pub fn dismiss_alert(store: &StateStore, id: AlertId) -> bool {
    let removed = store
        .update(|state| {
            let mut next = state.clone();
            next.alerts.retain(|a| a.id != id);
            let removed = next.alerts.len() != state.alerts.len();
            Some((next, removed))
        })
        .unwrap_or_default();
    info!(alert_id = %id, removed, "Alert dismissed");
    removed
}

/// Remove every outstanding alert. Returns how many were removed.
pub fn clear_all_alerts(store: &StateStore) -> usize {
    let cleared = store
        .update(|state| {
            let mut next = state.clone();
            next.alerts.clear();
            Some((next, state.alerts.len()))
        })
        .unwrap_or_default();
    info!(cleared, "All alerts cleared");
    cleared
}
