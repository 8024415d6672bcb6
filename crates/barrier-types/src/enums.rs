//! Enumeration types for the light barrier monitor.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How serious an alert or log entry is.
///
/// Alerts and log events share the same three-step scale so a threshold
/// crossing produces an alert and a log entry at the same severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Severity {
    /// Informational, no action required.
    Info,
    /// Contamination has entered the warning band.
    Warning,
    /// Contamination has entered the danger band.
    Critical,
}

impl Severity {
    /// Parse the lowercase wire name (`info`, `warning`, `critical`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Category of an entry in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// The light barrier was armed or disarmed.
    StatusChange,
    /// The contamination level moved by a significant amount.
    Contamination,
    /// A threshold crossing raised an alert.
    Alert,
    /// Process-level notices such as initialization.
    System,
}

impl EventType {
    /// Parse the `snake_case` wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "status_change" => Some(Self::StatusChange),
            "contamination" => Some(Self::Contamination),
            "alert" => Some(Self::Alert),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// Display band a contamination level falls into.
///
/// Bands are derived from the threshold policy. Only the `Warning` and
/// `Danger` boundaries raise alerts; `Safe` and `Elevated` are purely
/// visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ContaminationBand {
    /// Below the safe threshold.
    Safe,
    /// At or above safe, below warning.
    Elevated,
    /// At or above warning, below danger.
    Warning,
    /// At or above danger.
    Danger,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        let json = serde_json::to_string(&EventType::StatusChange).ok();
        assert_eq!(json.as_deref(), Some("\"status_change\""));
        let json = serde_json::to_string(&Severity::Critical).ok();
        assert_eq!(json.as_deref(), Some("\"critical\""));
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(EventType::from_name("alert"), Some(EventType::Alert));
        assert_eq!(EventType::from_name("ALERT"), None);
        assert_eq!(Severity::from_name("warning"), Some(Severity::Warning));
        assert_eq!(Severity::from_name("fatal"), None);
    }

    #[test]
    fn severity_orders_by_seriousness() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }
}
