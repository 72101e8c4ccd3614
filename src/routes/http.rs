// GET handlers: version, telemetry proxy, mock telemetry, dashboard, thresholds

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::AppState;
use crate::error::SourceError;
use crate::pipeline::RULES;
use crate::source::{self, now_ms};

fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/telemetry — ThingsBoard timeseries for the trailing hour, passed through verbatim.
pub(super) async fn telemetry_proxy_handler(
    State(state): State<AppState>,
) -> axum::response::Response {
    match state.thingsboard.fetch_raw(now_ms()).await {
        Ok(body) => Json(body).into_response(),
        Err(SourceError::MissingCredentials) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            SourceError::MissingCredentials.to_string(),
        ),
        Err(SourceError::Status(code)) => {
            tracing::error!(status = code, operation = "telemetry_proxy", "ThingsBoard API error");
            error_response(
                StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
                "Failed to fetch data from ThingsBoard",
            )
        }
        Err(e) => {
            tracing::error!(error = %e, operation = "telemetry_proxy", "Telemetry proxy failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/mock-telemetry — freshly generated hour of readings, 60 per channel.
pub(super) async fn mock_telemetry_handler() -> impl IntoResponse {
    let mut rng = StdRng::from_entropy();
    Json(source::generate(now_ms(), &mut rng))
}

/// GET /api/dashboard — series, current values, alerts and station fields as last applied.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.state.read().await.snapshot();
    Json(snapshot)
}

pub(super) async fn thresholds_handler() -> impl IntoResponse {
    Json(RULES)
}
