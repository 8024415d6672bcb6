//! Configuration loading and typed config structures for the monitor.
//!
//! The canonical configuration lives in `barrier-config.yaml`. Every
//! section is optional; missing values fall back to the defaults below
//! (thresholds 25 / 50 / 75, a 5 second tick, seed level 12.5).

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::thresholds::{ThresholdError, ThresholdPolicy};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The threshold boundaries are invalid.
    #[error("invalid thresholds: {source}")]
    Thresholds {
        /// The underlying threshold error.
        #[from]
        source: ThresholdError,
    },

    /// Some other value is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitorConfig {
    /// Contamination threshold boundaries.
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Simulation cadence and seeding.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Observer API server settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an environment override does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. An empty document yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Override values from process environment variables:
    ///
    /// - `BARRIER_TICK_INTERVAL_MS` overrides `simulation.tick_interval_ms`
    /// - `BARRIER_OBSERVER_PORT` overrides `observer.port`
    /// - `BARRIER_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric override does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric override does not parse.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BARRIER_TICK_INTERVAL_MS") {
            self.simulation.tick_interval_ms = parse_override("BARRIER_TICK_INTERVAL_MS", &val)?;
        }
        if let Some(val) = lookup("BARRIER_OBSERVER_PORT") {
            self.observer.port = parse_override("BARRIER_OBSERVER_PORT", &val)?;
        }
        if let Some(val) = lookup("BARRIER_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// Build the threshold policy from the configured boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Thresholds`] if the boundaries are invalid.
    pub fn threshold_policy(&self) -> Result<ThresholdPolicy, ConfigError> {
        let t = &self.thresholds;
        Ok(ThresholdPolicy::new(t.safe, t.warning, t.danger)?)
    }

    /// Check every startup invariant. Call once before building the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Thresholds`] for bad boundaries, or
    /// [`ConfigError::Invalid`] for a zero tick interval or an initial
    /// level outside `[0, 100]`.
    pub fn validate(&self) -> Result<ThresholdPolicy, ConfigError> {
        let policy = self.threshold_policy()?;
        if self.simulation.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulation.tick_interval_ms must be at least 1".to_owned(),
            });
        }
        let level = self.simulation.initial_level;
        if level < Decimal::ZERO || level > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Invalid {
                reason: format!("simulation.initial_level must be within 0..=100, got {level}"),
            });
        }
        Ok(policy)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, val: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e| ConfigError::Invalid {
        reason: format!("{key}={val}: {e}"),
    })
}

/// Threshold boundaries in percent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThresholdConfig {
    /// Upper bound of the safe display band.
    #[serde(default = "default_safe_threshold")]
    pub safe: Decimal,

    /// Warning alert boundary.
    #[serde(default = "default_warning_threshold")]
    pub warning: Decimal,

    /// Critical alert boundary.
    #[serde(default = "default_danger_threshold")]
    pub danger: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            safe: default_safe_threshold(),
            warning: default_warning_threshold(),
            danger: default_danger_threshold(),
        }
    }
}

/// Simulation cadence and seeding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Random seed for reproducible drift. Unset means seed from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Contamination level at startup.
    #[serde(default = "default_initial_level")]
    pub initial_level: Decimal,
}

impl SimulationConfig {
    /// The tick interval as a [`Duration`].
    pub const fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
            initial_level: default_initial_level(),
        }
    }
}

/// Observer API server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to start the HTTP server at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_safe_threshold() -> Decimal {
    Decimal::from(25)
}

fn default_warning_threshold() -> Decimal {
    Decimal::from(50)
}

fn default_danger_threshold() -> Decimal {
    Decimal::from(75)
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

const fn default_initial_level() -> Decimal {
    Decimal::from_parts(125, 0, 0, false, 1)
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
