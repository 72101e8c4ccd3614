// Push ingestion driver: keeps one event-stream subscription open and merges
// each record into the shared state. Reconnects after a fixed delay when the
// stream ends; dropping the Subscription cancels it.

use crate::models::DashboardSnapshot;
use crate::pipeline::{self, Event, SharedState};
use crate::source::{FirebaseStream, now_ms};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub struct SubscriberDeps {
    pub stream: FirebaseStream,
    pub state: SharedState,
    pub tx: broadcast::Sender<DashboardSnapshot>,
}

pub struct SubscriberConfig {
    pub reconnect_delay_ms: u64,
}

/// Handle to a running subscription. Dropping it aborts the task.
pub struct Subscription {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Signals the task and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

pub fn subscribe(deps: SubscriberDeps, config: SubscriberConfig) -> Subscription {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let SubscriberDeps { stream, state, tx } = deps;
    let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);

    let handle = tokio::spawn(async move {
        let url = stream.record_url();
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                result = run_stream(&stream, &state, &tx) => {
                    match result {
                        Ok(events) => tracing::info!(
                            operation = "push_subscription",
                            events,
                            "Push stream closed by server; reconnecting"
                        ),
                        Err(e) => tracing::warn!(
                            error = %e,
                            operation = "push_subscription",
                            "Push stream failed; reconnecting"
                        ),
                    }
                }
            }
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = tokio::time::sleep(reconnect_delay) => {
                    tracing::debug!(url = %redact(&url), "Reopening push stream");
                }
            }
        }
        tracing::debug!("Push subscriber shutting down");
    });

    Subscription {
        shutdown_tx: Some(shutdown_tx),
        handle: Some(handle),
    }
}

/// Applies records until the stream ends. Returns how many were applied.
async fn run_stream(
    stream: &FirebaseStream,
    state: &SharedState,
    tx: &broadcast::Sender<DashboardSnapshot>,
) -> Result<u64, crate::error::SourceError> {
    let mut events = stream.open().await?;
    tracing::info!(operation = "push_subscription", "Push stream connected");
    let mut applied = 0;
    while let Some(record) = events.next_record().await? {
        pipeline::commit(state, tx, vec![Event::PushUpdated(record)], now_ms()).await;
        applied += 1;
    }
    Ok(applied)
}

/// Strips the query string (it may carry the auth secret).
fn redact(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}
