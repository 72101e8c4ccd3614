// Ingestion adapters: pull sources driven by the poller, the push stream driven by the subscriber

mod http;
mod mock;
pub mod push;
mod thingsboard;

pub use http::HttpSource;
pub use mock::{DATA_POINTS, MockSource, SAMPLE_SPACING_MS, clamp_range, generate, timestamps};
pub use push::FirebaseStream;
pub use thingsboard::{TELEMETRY_KEYS, ThingsBoardSource, WINDOW_MS};

use std::future::Future;
use std::time::Duration;

use crate::config::{AppConfig, SourceKind};
use crate::error::SourceError;
use crate::models::TelemetryResponse;

/// A pull source: one call, one full trailing window for every pull channel.
pub trait TelemetrySource: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    fn fetch(&self) -> impl Future<Output = Result<TelemetryResponse, SourceError>> + Send;
}

/// The pull source selected by `[poller] source`.
pub enum PullSource {
    Mock(MockSource),
    ThingsBoard(ThingsBoardSource),
    Http(HttpSource),
}

impl PullSource {
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let client = http_client(config.poller.request_timeout_ms)?;
        Ok(match config.poller.source {
            SourceKind::Mock => PullSource::Mock(MockSource),
            SourceKind::Thingsboard => {
                PullSource::ThingsBoard(ThingsBoardSource::new(client, &config.thingsboard))
            }
            SourceKind::Http => PullSource::Http(HttpSource::new(
                client,
                config.poller.endpoint.clone().unwrap_or_default(),
            )),
        })
    }
}

impl TelemetrySource for PullSource {
    fn name(&self) -> &str {
        match self {
            PullSource::Mock(s) => s.name(),
            PullSource::ThingsBoard(s) => s.name(),
            PullSource::Http(s) => s.name(),
        }
    }

    async fn fetch(&self) -> Result<TelemetryResponse, SourceError> {
        match self {
            PullSource::Mock(s) => s.fetch().await,
            PullSource::ThingsBoard(s) => s.fetch().await,
            PullSource::Http(s) => s.fetch().await,
        }
    }
}

pub fn http_client(timeout_ms: u64) -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()?)
}

/// Client for long-lived event streams: bounded connect, unbounded body.
pub fn streaming_client(connect_timeout_ms: u64) -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(connect_timeout_ms))
        .build()?)
}

/// Current wall-clock time in ms since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Non-success status -> `Status`, otherwise decode the body as JSON.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SourceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
