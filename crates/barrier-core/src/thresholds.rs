//! Threshold policy: the three ascending contamination boundaries.
//!
//! The policy is built once at startup and never changes for the life of
//! the process. Construction fails fast on a non-ascending or non-positive
//! configuration so crossing detection never runs against nonsense bounds.

use barrier_types::{ContaminationBand, Severity};
use rust_decimal::Decimal;
use serde::Serialize;

/// Errors raised when building a [`ThresholdPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdError {
    /// A boundary is zero or negative.
    #[error("{name} threshold must be positive, got {value}")]
    NonPositive {
        /// Which boundary (`safe`, `warning`, `danger`).
        name: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// The boundaries are not strictly ascending.
    #[error("thresholds must satisfy safe < warning < danger, got {safe} / {warning} / {danger}")]
    NotAscending {
        /// Configured safe boundary.
        safe: Decimal,
        /// Configured warning boundary.
        warning: Decimal,
        /// Configured danger boundary.
        danger: Decimal,
    },
}

/// A boundary crossed on the way up during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    /// Severity of the alert the crossing raises.
    pub severity: Severity,
    /// The boundary that was crossed.
    pub threshold: Decimal,
}

/// Validated `safe < warning < danger` boundaries, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdPolicy {
    safe: Decimal,
    warning: Decimal,
    danger: Decimal,
}

impl ThresholdPolicy {
    /// Validate and build a policy.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError::NonPositive`] if any boundary is `<= 0`,
    /// or [`ThresholdError::NotAscending`] unless `safe < warning < danger`.
    pub fn new(safe: Decimal, warning: Decimal, danger: Decimal) -> Result<Self, ThresholdError> {
        for (name, value) in [("safe", safe), ("warning", warning), ("danger", danger)] {
            if value <= Decimal::ZERO {
                return Err(ThresholdError::NonPositive { name, value });
            }
        }
        if safe >= warning || warning >= danger {
            return Err(ThresholdError::NotAscending {
                safe,
                warning,
                danger,
            });
        }
        Ok(Self {
            safe,
            warning,
            danger,
        })
    }

    /// Upper bound of the safe display band.
    pub const fn safe(&self) -> Decimal {
        self.safe
    }

    /// Level at which a warning alert is raised.
    pub const fn warning(&self) -> Decimal {
        self.warning
    }

    /// Level at which a critical alert is raised.
    pub const fn danger(&self) -> Decimal {
        self.danger
    }

    /// Severity of a log entry describing the given level.
    pub fn severity_for(&self, level: Decimal) -> Severity {
        if level >= self.danger {
            Severity::Critical
        } else if level >= self.warning {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    /// Display band for the given level.
    pub fn band(&self, level: Decimal) -> ContaminationBand {
        if level < self.safe {
            ContaminationBand::Safe
        } else if level < self.warning {
            ContaminationBand::Elevated
        } else if level < self.danger {
            ContaminationBand::Warning
        } else {
            ContaminationBand::Danger
        }
    }

    /// Detect an upward crossing between two consecutive levels.
    ///
    /// Edge-triggered: only a transition from below a boundary to at or
    /// above it counts. Danger is checked first so a jump across both
    /// boundaries reports only the critical crossing. The safe boundary
    /// never produces a crossing.
    pub fn crossing(&self, previous: Decimal, current: Decimal) -> Option<Crossing> {
        let crossed = |threshold: Decimal| previous < threshold && current >= threshold;
        if crossed(self.danger) {
            Some(Crossing {
                severity: Severity::Critical,
                threshold: self.danger,
            })
        } else if crossed(self.warning) {
            Some(Crossing {
                severity: Severity::Warning,
                threshold: self.warning,
            })
        } else {
            None
        }
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            safe: Decimal::from(25),
            warning: Decimal::from(50),
            danger: Decimal::from(75),
        }
    }
}
