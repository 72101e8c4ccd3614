// Ingestion pipeline: series store -> current values -> alerts, behind a shared state handle

pub mod alerts;
pub mod projector;
pub mod state;
pub mod store;

pub use alerts::{Direction, RULES, ThresholdRule};
pub use state::{DashboardState, Event};
pub use store::TimeSeriesStore;

use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::models::DashboardSnapshot;

pub type SharedState = Arc<RwLock<DashboardState>>;

pub fn shared(window: usize) -> SharedState {
    Arc::new(RwLock::new(DashboardState::new(window)))
}

/// Applies `events` under one write lock (readers never see a half-applied
/// update), then publishes the resulting snapshot.
pub async fn commit(
    state: &SharedState,
    tx: &broadcast::Sender<DashboardSnapshot>,
    events: Vec<Event>,
    at_ms: i64,
) -> DashboardSnapshot {
    let snapshot = {
        let mut guard = state.write().await;
        let next = guard.clone().apply_all(events, at_ms);
        *guard = next;
        guard.snapshot()
    };
    if tx.send(snapshot.clone()).is_err() {
        tracing::trace!(
            operation = "broadcast_snapshot",
            "No active WebSocket clients; broadcast channel has no receivers"
        );
    }
    snapshot
}
