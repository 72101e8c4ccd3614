// Pull ingestion driver: one cycle per tick, never two at once.
// A cycle is awaited inside the loop and missed ticks are skipped, so a fetch
// slower than the interval delays the next cycle instead of overlapping it.

use crate::error::SourceError;
use crate::models::DashboardSnapshot;
use crate::pipeline::{self, Event, SharedState};
use crate::source::{TelemetrySource, now_ms};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, interval};
use tracing::Instrument;

/// Source, shared state, publish channel and shutdown for the poller.
pub struct PollerDeps<S> {
    pub source: S,
    pub state: SharedState,
    pub tx: broadcast::Sender<DashboardSnapshot>,
    /// Open /ws/dashboard sockets, maintained by the route handler.
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct PollerConfig {
    pub interval_ms: u64,
    /// How often to log cycle counters (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Fetch, then replace every pull series and recompute current values and alerts
/// as one update. On error nothing is touched.
pub async fn run_cycle<S: TelemetrySource>(
    source: &S,
    state: &SharedState,
    tx: &broadcast::Sender<DashboardSnapshot>,
) -> Result<DashboardSnapshot, SourceError> {
    let response = source.fetch().await?;
    Ok(pipeline::commit(state, tx, Event::from_response(response), now_ms()).await)
}

pub fn spawn<S>(deps: PollerDeps<S>, config: PollerConfig) -> tokio::task::JoinHandle<()>
where
    S: TelemetrySource + 'static,
{
    let PollerDeps {
        source,
        state,
        tx,
        ws_connections,
        mut shutdown_rx,
    } = deps;
    let PollerConfig {
        interval_ms,
        stats_log_interval_secs,
    } = config;

    let poller_span = tracing::span!(
        tracing::Level::DEBUG,
        "poller",
        source = source.name(),
        interval_ms
    );

    let task = async move {
        let mut tick = interval(Duration::from_millis(interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut cycles_ok: u64 = 0;
        let mut cycles_failed: u64 = 0;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match run_cycle(&source, &state, &tx).await {
                        Ok(snapshot) => {
                            cycles_ok += 1;
                            let raised = snapshot.alerts.values().filter(|a| **a).count();
                            tracing::debug!(
                                operation = "pull_cycle",
                                alerts_raised = raised,
                                "Telemetry refreshed"
                            );
                        }
                        Err(e) => {
                            cycles_failed += 1;
                            tracing::warn!(
                                error = %e,
                                operation = "pull_cycle",
                                source = source.name(),
                                "Telemetry fetch failed; keeping last known values"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Poller shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_clients = ws_connections.load(Ordering::Relaxed),
                        cycles_ok,
                        cycles_failed,
                        "poller stats"
                    );
                }
            }
        }
    };

    tokio::spawn(task.instrument(poller_span))
}
