//! Light barrier monitor binary.
//!
//! Wires the contamination simulation to the observer API and runs until
//! interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `barrier-config.yaml` (or `BARRIER_CONFIG`)
//! 2. Validate thresholds, tick interval, and initial level
//! 3. Initialize structured logging (tracing)
//! 4. Create the state store with the seed state
//! 5. Start the tick scheduler
//! 6. Start the Observer API server (if enabled)
//! 7. Wait for Ctrl-C, then stop the scheduler and drain the server

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use barrier_core::config::{LogFormat, LoggingConfig, MonitorConfig};
use barrier_core::drift::RandomDrift;
use barrier_core::scheduler::Scheduler;
use barrier_core::store::StateStore;
use barrier_core::tick::{self, SimulationEngine};
use barrier_observer::{AppState, ServerConfig, ServerError};
use barrier_types::SystemState;
use rust_decimal::Decimal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::MonitorError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "barrier-config.yaml";

/// Running Observer server task and its shutdown trigger.
struct Observer {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), ServerError>>,
}

/// Application entry point.
///
/// Runs on a single-threaded runtime: the tick and every request handler
/// share one thread, so store mutations never contend.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a subsystem fails to
/// start, or the observer server fails while running.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), MonitorError> {
    // 1-2. Load and validate configuration before anything else runs.
    let config = load_config(|key| std::env::var(key).ok())?;
    let policy = config.validate()?;

    // 3. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        safe = %policy.safe(),
        warning = %policy.warning(),
        danger = %policy.danger(),
        tick_interval_ms = config.simulation.tick_interval_ms,
        seed = ?config.simulation.seed,
        "barrier-monitor starting"
    );

    // 4. Create the state store.
    let store = Arc::new(StateStore::new(initial_state(
        config.simulation.initial_level,
    )));

    // 5. Start the scheduler.
    let engine = SimulationEngine::new(
        policy,
        Box::new(RandomDrift::from_seed_option(config.simulation.seed)),
    );
    let mut scheduler = Scheduler::new(
        Arc::clone(&store),
        engine,
        config.simulation.tick_period(),
    )?;
    scheduler.start()?;
    info!(
        period_ms = scheduler.period().as_millis(),
        "Contamination sampling started"
    );

    // 6. Start the Observer API server.
    let mut observer = if config.observer.enabled {
        let app_state = Arc::new(AppState::new(Arc::clone(&store), policy));
        Some(spawn_observer(ServerConfig::from(&config.observer), app_state))
    } else {
        info!("Observer disabled");
        None
    };

    // 7. Run until Ctrl-C or until the observer dies on its own.
    let early_exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|source| MonitorError::Signal { source })?;
            info!("Shutdown signal received");
            None
        }
        exit = observer_exit(observer.as_mut().map(|o| &mut o.handle)) => Some(exit),
    };

    scheduler.stop().await;

    match (early_exit, observer) {
        (Some(exit), _) => {
            exit.inspect_err(|e| error!(error = %e, "Observer stopped unexpectedly"))?;
        }
        (None, Some(Observer { shutdown, handle })) => {
            // The server may already be gone; a closed channel is fine.
            let _ = shutdown.send(());
            join_observer(handle).await?;
        }
        (None, None) => {}
    }

    let snapshot = store.snapshot();
    info!(
        ticks = snapshot.tick,
        level = %snapshot.contamination_level,
        alerts = snapshot.alerts.len(),
        "barrier-monitor shutdown complete"
    );
    Ok(())
}

/// Resolve the configuration path: `BARRIER_CONFIG` if set, otherwise
/// [`DEFAULT_CONFIG_PATH`].
fn config_path<F>(lookup: &F) -> (PathBuf, bool)
where
    F: Fn(&str) -> Option<String>,
{
    lookup("BARRIER_CONFIG").map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        |path| (PathBuf::from(path), true),
    )
}

/// Load configuration.
///
/// A file (explicit or default) goes through [`MonitorConfig::from_file`],
/// which applies the process environment overrides. A missing default file
/// means defaults plus overrides from `lookup`. A missing file named
/// explicitly by `BARRIER_CONFIG` is an error.
fn load_config<F>(lookup: F) -> Result<MonitorConfig, MonitorError>
where
    F: Fn(&str) -> Option<String>,
{
    let (path, explicit) = config_path(&lookup);
    if explicit || path.exists() {
        Ok(MonitorConfig::from_file(&path)?)
    } else {
        let mut config = MonitorConfig::default();
        config.apply_overrides_from(&lookup)?;
        Ok(config)
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Seed state with the configured level clamped and rounded like any
/// ticked level.
fn initial_state(level: Decimal) -> SystemState {
    SystemState::initial(tick::next_level(level, Decimal::ZERO))
}

/// Spawn the Observer server on its own task.
fn spawn_observer(config: ServerConfig, state: Arc<AppState>) -> Observer {
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        barrier_observer::start_server(&config, state, async {
            let _ = shutdown_rx.await;
        })
        .await
    });
    Observer { shutdown, handle }
}

/// Resolve when the observer task ends. Never resolves when there is no
/// observer.
async fn observer_exit(
    handle: Option<&mut JoinHandle<Result<(), ServerError>>>,
) -> Result<(), MonitorError> {
    match handle {
        Some(handle) => join_observer(handle).await,
        None => std::future::pending().await,
    }
}

/// Await the observer task and flatten its result.
async fn join_observer<H>(handle: H) -> Result<(), MonitorError>
where
    H: std::future::Future<Output = Result<Result<(), ServerError>, tokio::task::JoinError>>,
{
    match handle.await {
        Ok(result) => Ok(result?),
        Err(e) => Err(MonitorError::ObserverTask {
            message: e.to_string(),
        }),
    }
}
