// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::models::DashboardSnapshot;
use crate::pipeline::SharedState;
use crate::source::ThingsBoardSource;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) snapshot_tx: broadcast::Sender<DashboardSnapshot>,
    pub(crate) state: SharedState,
    pub(crate) thingsboard: Arc<ThingsBoardSource>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    snapshot_tx: broadcast::Sender<DashboardSnapshot>,
    state: SharedState,
    thingsboard: Arc<ThingsBoardSource>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        snapshot_tx,
        state,
        thingsboard,
        ws_connections,
    };
    Router::new()
        .route("/", get(|| async { "weatherdash telemetry service" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/telemetry", get(http::telemetry_proxy_handler)) // GET /api/telemetry
        .route("/api/mock-telemetry", get(http::mock_telemetry_handler)) // GET /api/mock-telemetry
        .route("/api/dashboard", get(http::dashboard_handler)) // GET /api/dashboard
        .route("/api/thresholds", get(http::thresholds_handler)) // GET /api/thresholds
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
