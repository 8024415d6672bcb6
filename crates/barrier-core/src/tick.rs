//! Simulation engine: one contamination sample per tick.
//!
//! Each tick runs these steps as a single store mutation:
//!
//! 1. **Gate** -- a disarmed barrier reports nothing; the tick is a no-op
//!    and no snapshot is committed.
//! 2. **Level update** -- draw a delta from the [`DriftSource`], clamp the
//!    new level to `[0, 100]`, round to one decimal place.
//! 3. **Contamination event** -- a move larger than 3 points is logged,
//!    with severity taken from where the new level lands.
//! 4. **Crossing detection** -- an upward crossing of the danger boundary
//!    raises a critical alert; otherwise an upward crossing of the warning
//!    boundary raises a warning alert. Each alert is paired with an
//!    `alert` log entry.
//! 5. **Bound enforcement** -- the event log drops its oldest entries past
//!    its bound. Alerts are never trimmed here.
//! 6. **Commit** -- the new snapshot is published to subscribers.

use barrier_types::{Alert, EventType, LogEvent, Severity, SystemState};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::drift::DriftSource;
use crate::store::StateStore;
use crate::thresholds::ThresholdPolicy;

/// Moves strictly larger than this many points are logged.
const SIGNIFICANT_CHANGE: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Summary of a tick that sampled contamination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was applied.
    pub tick: u64,
    /// Level before the tick.
    pub previous_level: Decimal,
    /// Level after clamping and rounding.
    pub level: Decimal,
    /// The raw delta drawn from the drift source.
    pub delta: Decimal,
    /// Severity of the alert raised this tick, if any.
    pub alert_raised: Option<Severity>,
    /// Number of log entries appended.
    pub events_appended: usize,
}

/// What a call to [`SimulationEngine::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The barrier is disarmed; state was left untouched.
    Gated,
    /// A sample was taken and committed.
    Advanced(TickSummary),
}

/// Drives contamination sampling against a [`StateStore`].
pub struct SimulationEngine {
    policy: ThresholdPolicy,
    drift: Box<dyn DriftSource>,
}

impl SimulationEngine {
    /// Create an engine with the given policy and drift source.
    pub fn new(policy: ThresholdPolicy, drift: Box<dyn DriftSource>) -> Self {
        Self { policy, drift }
    }

    /// Run one tick against the store.
    pub fn tick(&mut self, store: &StateStore) -> TickOutcome {
        let policy = self.policy;
        let drift = &mut self.drift;
        let outcome = store.update(|state| {
            if !state.barrier_active {
                return None;
            }
            let delta = drift.next_delta();
            Some(advance(state, delta, &policy))
        });

        match outcome {
            None => {
                debug!("Barrier inactive, tick skipped");
                TickOutcome::Gated
            }
            Some(summary) => {
                if let Some(severity) = summary.alert_raised {
                    warn!(
                        tick = summary.tick,
                        level = %summary.level,
                        ?severity,
                        "Contamination threshold crossed"
                    );
                }
                debug!(
                    tick = summary.tick,
                    previous = %summary.previous_level,
                    level = %summary.level,
                    delta = %summary.delta.round_dp(2),
                    events_appended = summary.events_appended,
                    "Tick applied"
                );
                TickOutcome::Advanced(summary)
            }
        }
    }
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Apply one armed tick with a known delta, producing the next state.
///
/// Pure with respect to the store: the caller decides whether to commit.
/// The gate is the caller's job; this always samples.
pub fn advance(
    state: &SystemState,
    delta: Decimal,
    policy: &ThresholdPolicy,
) -> (SystemState, TickSummary) {
    let previous_level = state.contamination_level;
    let level = next_level(previous_level, delta);

    let mut next = state.clone();
    next.contamination_level = level;
    next.tick = state.tick.saturating_add(1);
    let mut events_appended: usize = 0;

    if delta.abs() > SIGNIFICANT_CHANGE {
        let direction = if delta > Decimal::ZERO {
            "increased"
        } else {
            "decreased"
        };
        next.events.push(LogEvent::new(
            EventType::Contamination,
            policy.severity_for(level),
            format!("Contamination level {direction} to {level:.1}%"),
        ));
        events_appended = events_appended.saturating_add(1);
    }

    let crossing = policy.crossing(previous_level, level);
    if let Some(crossing) = crossing {
        let message = alert_message(crossing.severity, crossing.threshold);
        next.alerts.push(Alert::new(crossing.severity, message.clone()));
        next.events
            .push(LogEvent::new(EventType::Alert, crossing.severity, message));
        events_appended = events_appended.saturating_add(1);
    }

    let summary = TickSummary {
        tick: next.tick,
        previous_level,
        level,
        delta,
        alert_raised: crossing.map(|c| c.severity),
        events_appended,
    };
    (next, summary)
}

/// Clamp `previous + delta` to `[0, 100]` and round to one decimal place,
/// halves rounding up. The result always carries exactly one decimal digit,
/// so whole levels render as `60.0` rather than `60`.
pub fn next_level(previous: Decimal, delta: Decimal) -> Decimal {
    let mut level = previous
        .saturating_add(delta)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    level.rescale(1);
    level
}

fn alert_message(severity: Severity, threshold: Decimal) -> String {
    let label = match severity {
        Severity::Critical => "CRITICAL",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    };
    format!("{label}: Contamination level exceeded {threshold}%")
}
