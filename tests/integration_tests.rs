// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum::response::IntoResponse;
use axum::{Json, Router, extract::Path, http::HeaderMap, http::StatusCode, routing::get};
use axum_test::TestServer;
use common::{TEST_CONFIG, mixed_response, spawn_upstream};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use weatherdash::config::{AppConfig, ThingsBoardConfig};
use weatherdash::models::{Channel, DashboardSnapshot, PULL_CHANNELS, TelemetryResponse};
use weatherdash::pipeline::{self, Event, SharedState};
use weatherdash::routes;
use weatherdash::source::{DATA_POINTS, SAMPLE_SPACING_MS, ThingsBoardSource, clamp_range};

fn test_app_with_thingsboard(
    tb: ThingsBoardConfig,
) -> (Router, broadcast::Sender<DashboardSnapshot>, SharedState) {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let (tx, _) = broadcast::channel(config.publishing.broadcast_capacity);
    let state = pipeline::shared(config.poller.max_points);
    let app = routes::app(
        tx.clone(),
        state.clone(),
        Arc::new(ThingsBoardSource::new(reqwest::Client::new(), &tb)),
        Arc::new(AtomicUsize::new(0)),
    );
    (app, tx, state)
}

fn test_app() -> (Router, broadcast::Sender<DashboardSnapshot>, SharedState) {
    test_app_with_thingsboard(ThingsBoardConfig::default())
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("weatherdash telemetry service");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("weatherdash")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_mock_telemetry_shape() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let before = chrono::Utc::now().timestamp_millis();
    let response = server.get("/api/mock-telemetry").await;
    let after = chrono::Utc::now().timestamp_millis();
    response.assert_status_ok();

    let body: TelemetryResponse = response.json();
    for channel in PULL_CHANNELS {
        let series = body.series(channel);
        assert_eq!(series.len(), DATA_POINTS, "{channel:?}");
        assert!(series.windows(2).all(|w| w[1].ts - w[0].ts == SAMPLE_SPACING_MS));
        let last = series.last().unwrap().ts;
        assert!(last >= before && last <= after);
        let (min, max) = clamp_range(channel).unwrap();
        assert!(series.iter().all(|s| s.value >= min && s.value <= max));
    }
}

#[tokio::test]
async fn test_telemetry_proxy_without_credentials_returns_500() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/api/telemetry").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "ThingsBoard credentials not configured");
}

fn tb_config(api_url: String) -> ThingsBoardConfig {
    ThingsBoardConfig {
        token: Some("secret-token".into()),
        device_id: Some("dev-42".into()),
        api_url,
    }
}

#[tokio::test]
async fn test_telemetry_proxy_returns_upstream_body_verbatim() {
    let upstream = Router::new().route(
        "/api/plugins/telemetry/DEVICE/{device}/values/timeseries",
        get(|Path(device): Path<String>, headers: HeaderMap| async move {
            let auth = headers
                .get("X-Authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if device != "dev-42" || auth != "Bearer secret-token" {
                return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({}))).into_response();
            }
            Json(serde_json::json!({
                "temperature": [{"ts": 2000, "value": "24.5"}, {"ts": 1000, "value": "23.0"}],
                "extra": true
            }))
            .into_response()
        }),
    );
    let base = spawn_upstream(upstream).await;

    let (app, _, _) = test_app_with_thingsboard(tb_config(base));
    let server = TestServer::new(app);
    let response = server.get("/api/telemetry").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["temperature"][0]["value"], "24.5");
    assert_eq!(json["extra"], true);
}

#[tokio::test]
async fn test_telemetry_proxy_forwards_upstream_status() {
    let upstream = Router::new().route(
        "/api/plugins/telemetry/DEVICE/{device}/values/timeseries",
        get(|| async { StatusCode::UNAUTHORIZED }),
    );
    let base = spawn_upstream(upstream).await;

    let (app, _, _) = test_app_with_thingsboard(tb_config(base));
    let server = TestServer::new(app);
    let response = server.get("/api/telemetry").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Failed to fetch data from ThingsBoard");
}

#[tokio::test]
async fn test_telemetry_proxy_transport_failure_returns_500() {
    // Bind then drop, so nothing is listening on the port.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (app, _, _) = test_app_with_thingsboard(tb_config(base));
    let server = TestServer::new(app);
    let response = server.get("/api/telemetry").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = response.json();
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_dashboard_reflects_committed_state() {
    let (app, tx, state) = test_app();
    let server = TestServer::new(app);

    let initial: DashboardSnapshot = server.get("/api/dashboard").await.json();
    assert_eq!(initial.updated_at, None);
    assert!(initial.alerts.values().all(|a| !a));
    assert_eq!(initial.station.wind_direction, "NA");

    pipeline::commit(&state, &tx, Event::from_response(mixed_response()), 99).await;

    let snapshot: DashboardSnapshot = server.get("/api/dashboard").await.json();
    assert_eq!(snapshot.updated_at, Some(99));
    assert_eq!(snapshot.current[&Channel::Temperature], 26.0);
    assert!(snapshot.alerts[&Channel::Temperature]);
    assert!(!snapshot.alerts[&Channel::Humidity]);
    assert!(snapshot.alerts[&Channel::Pressure]);
    assert_eq!(snapshot.series[&Channel::Pressure].len(), 1);
}

#[tokio::test]
async fn test_thresholds_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app);
    let json: serde_json::Value = server.get("/api/thresholds").await.json();
    let rules = json.as_array().unwrap();
    assert_eq!(rules.len(), 4);
    let pressure = rules
        .iter()
        .find(|r| r["channel"] == "pressure")
        .unwrap();
    assert_eq!(pressure["direction"], "BELOW");
    assert_eq!(pressure["bound"], 1010.0);
}

// --- WebSocket tests (require http_transport + ws feature) ---
// Receive until we get valid JSON (server may send Ping first).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_dashboard_sends_current_then_updates() {
    let (app, tx, state) = test_app();
    let server = TestServer::builder().http_transport().build(app);
    let mut ws = server
        .get_websocket("/ws/dashboard")
        .await
        .into_websocket()
        .await;

    let welcome: DashboardSnapshot = receive_first_json_text(&mut ws).await;
    assert_eq!(welcome.updated_at, None);

    let state_clone = state.clone();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        pipeline::commit(
            &state_clone,
            &tx_clone,
            Event::from_response(mixed_response()),
            42,
        )
        .await;
    });

    let update: DashboardSnapshot = receive_first_json_text(&mut ws).await;
    assert_eq!(update.updated_at, Some(42));
    assert_eq!(update.current[&Channel::Pressure], 1005.0);
    assert!(update.alerts[&Channel::Pressure]);
}

#[tokio::test]
async fn test_ws_dashboard_tracks_open_connections() {
    let ws_connections = Arc::new(AtomicUsize::new(0));
    let app = routes::app(
        broadcast::channel(4).0,
        pipeline::shared(60),
        Arc::new(ThingsBoardSource::new(
            reqwest::Client::new(),
            &ThingsBoardConfig::default(),
        )),
        ws_connections.clone(),
    );
    let server = TestServer::builder().http_transport().build(app);
    let mut ws = server
        .get_websocket("/ws/dashboard")
        .await
        .into_websocket()
        .await;

    let _: DashboardSnapshot = receive_first_json_text(&mut ws).await;
    assert_eq!(ws_connections.load(std::sync::atomic::Ordering::SeqCst), 1);

    drop(ws);
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(2);
    while ws_connections.load(std::sync::atomic::Ordering::SeqCst) != 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "connection count not released after client went away"
        );
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }
}
