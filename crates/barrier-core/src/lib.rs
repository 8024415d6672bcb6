//! Contamination simulation, state store, and tick scheduling for the light
//! barrier monitor.
//!
//! This crate owns the single live [`SystemState`] and everything that
//! writes to it: the periodic simulation tick and the operator control
//! operations.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `barrier-config.yaml` into
//!   strongly-typed structs, with environment overrides.
//! - [`control`] -- Barrier toggle and alert dismissal operations.
//! - [`drift`] -- [`DriftSource`] trait with [`RandomDrift`] and
//!   [`ScriptedDrift`].
//! - [`scheduler`] -- Fixed-period Tokio task that drives the engine.
//! - [`store`] -- [`StateStore`] snapshot owner and change subscriptions.
//! - [`thresholds`] -- Alert thresholds and crossing detection.
//! - [`tick`] -- The simulation tick: drift, clamp, events, and alerts.
//!
//! [`SystemState`]: barrier_types::SystemState
//! [`DriftSource`]: drift::DriftSource
//! [`RandomDrift`]: drift::RandomDrift
//! [`ScriptedDrift`]: drift::ScriptedDrift
//! [`StateStore`]: store::StateStore

pub mod config;
pub mod control;
pub mod drift;
pub mod scheduler;
pub mod store;
pub mod thresholds;
pub mod tick;
