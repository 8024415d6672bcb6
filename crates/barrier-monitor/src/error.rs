//! Error types for the monitor binary.
//!
//! [`MonitorError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and teardown.

/// Top-level error for the monitor binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: barrier_core::config::ConfigError,
    },

    /// The tick scheduler could not start.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: barrier_core::scheduler::SchedulerError,
    },

    /// The Observer API server failed.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: barrier_observer::ServerError,
    },

    /// The Observer server task ended abnormally.
    #[error("observer task error: {message}")]
    ObserverTask {
        /// Description of the task failure.
        message: String,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
