//! Fixed-period tick scheduler.
//!
//! [`Scheduler`] owns the [`SimulationEngine`] and a Tokio task that ticks
//! it once per period. It has two states:
//!
//! - **Idle** -- no task exists; the engine is held by the scheduler.
//! - **Running** -- a task owns the engine and ticks it every period.
//!
//! [`Scheduler::stop`] signals the task and awaits it, so once `stop`
//! returns no further tick can touch the store. Stopping an idle scheduler
//! is a no-op. Dropping a running scheduler aborts the task.
//!
//! Aborting is only a cancellation request: on a multi-thread runtime a
//! tick already executing on another worker may still commit after `drop`
//! returns. Use [`Scheduler::stop`] when no further tick may run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::store::StateStore;
use crate::tick::SimulationEngine;

/// Errors that can occur when starting the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The tick period is zero.
    #[error("tick period must be non-zero")]
    ZeroPeriod,

    /// The engine was lost when a previous tick task failed, so there is
    /// nothing left to run.
    #[error("simulation engine unavailable: {reason}")]
    EngineLost {
        /// What happened to the engine.
        reason: String,
    },
}

/// Handle to a running tick task.
struct Running {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<SimulationEngine>,
}

/// Drives a [`SimulationEngine`] against a [`StateStore`] at a fixed period.
pub struct Scheduler {
    store: Arc<StateStore>,
    period: Duration,
    engine: Option<SimulationEngine>,
    running: Option<Running>,
    lost: Option<String>,
}

impl Scheduler {
    /// Create an idle scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroPeriod`] if `period` is zero.
    pub fn new(
        store: Arc<StateStore>,
        engine: SimulationEngine,
        period: Duration,
    ) -> Result<Self, SchedulerError> {
        if period.is_zero() {
            return Err(SchedulerError::ZeroPeriod);
        }
        Ok(Self {
            store,
            period,
            engine: Some(engine),
            running: None,
            lost: None,
        })
    }

    /// The configured tick period.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Whether a tick task is currently registered.
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Transition Idle -> Running. The first tick fires one full period
    /// after this call. Starting a running scheduler is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::EngineLost`] if a previous task panicked
    /// and took the engine with it.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.running.is_some() {
            return Ok(());
        }
        let Some(engine) = self.engine.take() else {
            return Err(SchedulerError::EngineLost {
                reason: self
                    .lost
                    .clone()
                    .unwrap_or_else(|| "engine missing".to_owned()),
            });
        };

        let (shutdown, shutdown_rx) = oneshot::channel();
        let first = Instant::now()
            .checked_add(self.period)
            .unwrap_or_else(Instant::now);
        let handle = tokio::spawn(run_ticks(
            Arc::clone(&self.store),
            engine,
            first,
            self.period,
            shutdown_rx,
        ));
        self.running = Some(Running { shutdown, handle });
        info!(period_ms = self.period.as_millis(), "Scheduler started");
        Ok(())
    }

    /// Transition Running -> Idle and wait for the tick task to finish.
    ///
    /// After this returns no further tick runs. Idempotent.
    pub async fn stop(&mut self) {
        let Some(Running { shutdown, handle }) = self.running.take() else {
            return;
        };
        // The task may already have exited; a closed channel is fine.
        let _ = shutdown.send(());
        match handle.await {
            Ok(engine) => {
                self.engine = Some(engine);
                info!("Scheduler stopped");
            }
            Err(e) => {
                warn!(error = %e, "Tick task ended abnormally, engine lost");
                self.lost = Some(e.to_string());
            }
        }
    }

    /// Stop (if running) and start again with the same engine.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::EngineLost`] if the engine did not survive
    /// the stop.
    pub async fn restart(&mut self) -> Result<(), SchedulerError> {
        self.stop().await;
        self.start()
    }
}

/// Best-effort cleanup. The task is aborted, not joined; see the module
/// docs for the guarantee [`Scheduler::stop`] gives instead.
impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Tick loop body. Returns the engine so a stopped scheduler can restart.
async fn run_ticks(
    store: Arc<StateStore>,
    mut engine: SimulationEngine,
    first: Instant,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) -> SimulationEngine {
    let mut ticker = tokio::time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            // Either an explicit stop or the scheduler being dropped.
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let _ = engine.tick(&store);
            }
        }
    }
    engine
}
