//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the live [`StateStore`], the threshold policy it is
//! judged against, and the broadcast channel that fans committed snapshots
//! out to `WebSocket` clients. The channel is fed by a single store
//! subscription owned by the state, so it stops when the state is dropped.

use std::sync::Arc;

use barrier_core::store::{StateStore, Subscription};
use barrier_core::thresholds::ThresholdPolicy;
use barrier_types::{ContaminationBand, SystemState};
use serde::Serialize;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for state snapshots.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// JSON view of a snapshot as served to dashboards.
///
/// The snapshot fields are flattened in, with the display band and the
/// threshold boundaries alongside so a client never has to know the
/// policy up front.
#[derive(Debug, Serialize)]
pub struct StateView<'a> {
    /// The committed snapshot.
    #[serde(flatten)]
    pub state: &'a SystemState,
    /// Display band of the current level.
    pub band: ContaminationBand,
    /// Threshold boundaries in force.
    pub thresholds: &'a ThresholdPolicy,
}

impl<'a> StateView<'a> {
    /// Build a view of `state` under `policy`.
    pub fn new(state: &'a SystemState, policy: &'a ThresholdPolicy) -> Self {
        Self {
            state,
            band: policy.band(state.contamination_level),
            thresholds: policy,
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// The live state store.
    pub store: Arc<StateStore>,
    /// The threshold policy the engine runs with.
    pub policy: ThresholdPolicy,
    /// Broadcast sender for committed snapshots.
    pub tx: broadcast::Sender<Arc<SystemState>>,
    /// Store subscription feeding `tx`; dropped with the state.
    _feed: Subscription,
}

impl AppState {
    /// Create the application state and start forwarding store changes
    /// onto the broadcast channel.
    pub fn new(store: Arc<StateStore>, policy: ThresholdPolicy) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let sender = tx.clone();
        let feed = store.subscribe(move |snapshot| {
            // send fails only when no client is connected.
            let _ = sender.send(Arc::clone(snapshot));
        });
        Self {
            store,
            policy,
            tx,
            _feed: feed,
        }
    }

    /// Subscribe to the snapshot broadcast channel.
    ///
    /// Returns a receiver that yields every snapshot committed after this
    /// call.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SystemState>> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("policy", &self.policy)
            .field("receivers", &self.tx.receiver_count())
            .finish_non_exhaustive()
    }
}
