// Shared test helpers
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use weatherdash::error::SourceError;
use weatherdash::models::{Sample, TelemetryResponse};
use weatherdash::source::TelemetrySource;

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[poller]
source = "mock"
interval_ms = 10000
max_points = 120

[publishing]
broadcast_capacity = 10
"#;

/// Upstream body with one temperature and one pressure reading, empty humidity and wind.
pub const MIXED_PAYLOAD: &str = r#"{
    "temperature": [{"ts": 1000, "value": 26}],
    "humidity": [],
    "windSpeed": [],
    "pressure": [{"ts": 1000, "value": 1005}]
}"#;

pub fn mixed_response() -> TelemetryResponse {
    serde_json::from_str(MIXED_PAYLOAD).unwrap()
}

pub fn calm_response() -> TelemetryResponse {
    TelemetryResponse {
        temperature: vec![Sample::new(1, 21.0), Sample::new(2, 22.0)],
        humidity: vec![Sample::new(1, 45.0), Sample::new(2, 47.0)],
        wind_speed: vec![Sample::new(1, 3.0), Sample::new(2, 4.0)],
        pressure: vec![Sample::new(1, 1015.0), Sample::new(2, 1016.0)],
    }
}

/// Serves `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Always returns the same response.
pub struct StaticSource(pub TelemetryResponse);

impl TelemetrySource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<TelemetryResponse, SourceError> {
        Ok(self.0.clone())
    }
}

/// Always fails as if upstream answered with `status`.
pub struct FailingSource(pub u16);

impl TelemetrySource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(&self) -> Result<TelemetryResponse, SourceError> {
        Err(SourceError::Status(self.0))
    }
}

/// Takes `delay` per fetch and records the highest number of fetches in flight at once.
pub struct SlowSource {
    pub delay: std::time::Duration,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
}

impl SlowSource {
    pub fn new(delay: std::time::Duration) -> Self {
        Self {
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TelemetrySource for SlowSource {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch(&self) -> Result<TelemetryResponse, SourceError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(calm_response())
    }
}
