//! Drift source trait and implementations.
//!
//! Each tick the engine asks a [`DriftSource`] how far the contamination
//! level moved. The production source, [`RandomDrift`], samples uniformly
//! from `[-2, +6)`: the walk is deliberately biased upward to model
//! contamination that builds up unless something intervenes.
//! [`ScriptedDrift`] replays a fixed sequence and exists for tests and
//! demos that need exact levels.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Lower bound (inclusive) of a random drift step, in percentage points.
pub const DRIFT_MIN: f64 = -2.0;

/// Upper bound (exclusive) of a random drift step, in percentage points.
pub const DRIFT_MAX: f64 = 6.0;

/// A source of per-tick contamination deltas.
pub trait DriftSource: Send {
    /// Return the change to apply this tick, in percentage points.
    fn next_delta(&mut self) -> Decimal;
}

/// Uniform random drift over `[DRIFT_MIN, DRIFT_MAX)`.
#[derive(Debug, Clone)]
pub struct RandomDrift {
    rng: StdRng,
}

impl RandomDrift {
    /// Create a drift source with a fixed seed for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a drift source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when a seed is configured, OS entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl DriftSource for RandomDrift {
    fn next_delta(&mut self) -> Decimal {
        let raw: f64 = self.rng.random_range(DRIFT_MIN..DRIFT_MAX);
        // Every value in the range is finite, so conversion cannot fail.
        Decimal::from_f64_retain(raw).unwrap_or(Decimal::ZERO)
    }
}

/// Replays a fixed list of deltas, then reports zero drift.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDrift {
    deltas: VecDeque<Decimal>,
}

impl ScriptedDrift {
    /// Create a source that yields `deltas` in order.
    pub fn new<I: IntoIterator<Item = Decimal>>(deltas: I) -> Self {
        Self {
            deltas: deltas.into_iter().collect(),
        }
    }
}

impl DriftSource for ScriptedDrift {
    fn next_delta(&mut self) -> Decimal {
        self.deltas.pop_front().unwrap_or(Decimal::ZERO)
    }
}
