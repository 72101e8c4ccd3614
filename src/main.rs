use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use weatherdash::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let (tx, _) =
        broadcast::channel::<models::DashboardSnapshot>(app_config.publishing.broadcast_capacity);
    let state = pipeline::shared(app_config.poller.max_points);

    let client = source::http_client(app_config.poller.request_timeout_ms)?;
    let thingsboard = Arc::new(source::ThingsBoardSource::new(
        client,
        &app_config.thingsboard,
    ));
    if !thingsboard.is_configured() {
        tracing::warn!("ThingsBoard credentials not configured; /api/telemetry will return 500");
    }

    let ws_connections = Arc::new(AtomicUsize::new(0));
    let (poller_shutdown_tx, poller_shutdown_rx) = tokio::sync::oneshot::channel();
    let pull_source = source::PullSource::from_config(&app_config)?;
    tracing::info!(
        source = source::TelemetrySource::name(&pull_source),
        interval_ms = app_config.poller.interval_ms,
        "Starting telemetry poller"
    );
    let poller_handle = poller::spawn(
        poller::PollerDeps {
            source: pull_source,
            state: state.clone(),
            tx: tx.clone(),
            ws_connections: ws_connections.clone(),
            shutdown_rx: poller_shutdown_rx,
        },
        poller::PollerConfig {
            interval_ms: app_config.poller.interval_ms,
            stats_log_interval_secs: app_config.poller.stats_log_interval_secs,
        },
    );

    let subscription = if app_config.push.enabled {
        let stream_client = source::streaming_client(app_config.poller.request_timeout_ms)?;
        Some(subscriber::subscribe(
            subscriber::SubscriberDeps {
                stream: source::FirebaseStream::new(stream_client, &app_config.push),
                state: state.clone(),
                tx: tx.clone(),
            },
            subscriber::SubscriberConfig {
                reconnect_delay_ms: app_config.push.reconnect_delay_ms,
            },
        ))
    } else {
        None
    };

    let app = routes::app(tx, state, thingsboard, ws_connections);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = poller_shutdown_tx.send(());
    let _ = poller_handle.await;
    if let Some(subscription) = subscription {
        subscription.shutdown().await;
    }

    Ok(())
}
