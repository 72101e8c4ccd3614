// ThingsBoard timeseries client: pull adapter and the /api/telemetry proxy

use super::{TelemetrySource, now_ms, read_json};
use crate::config::ThingsBoardConfig;
use crate::error::SourceError;
use crate::models::TelemetryResponse;

/// Keys requested from the device, in pull-catalog order.
pub const TELEMETRY_KEYS: &str = "temperature,humidity,windSpeed,pressure";

/// Trailing window requested on every call (1 hour).
pub const WINDOW_MS: i64 = 3_600_000;

pub struct ThingsBoardSource {
    client: reqwest::Client,
    config: ThingsBoardConfig,
}

impl ThingsBoardSource {
    pub fn new(client: reqwest::Client, config: &ThingsBoardConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.credentials().is_some()
    }

    /// Timeseries URL for the window ending at `end_ms`.
    pub fn timeseries_url(&self, device_id: &str, end_ms: i64) -> String {
        format!(
            "{}/api/plugins/telemetry/DEVICE/{}/values/timeseries?keys={}&startTs={}&endTs={}",
            self.config.api_url.trim_end_matches('/'),
            device_id,
            TELEMETRY_KEYS,
            end_ms - WINDOW_MS,
            end_ms
        )
    }

    /// Upstream body as-is, for proxying.
    pub async fn fetch_raw(&self, end_ms: i64) -> Result<serde_json::Value, SourceError> {
        let (token, device_id) = self
            .config
            .credentials()
            .ok_or(SourceError::MissingCredentials)?;
        let response = self
            .client
            .get(self.timeseries_url(device_id, end_ms))
            .header("Content-Type", "application/json")
            .header("X-Authorization", format!("Bearer {token}"))
            .send()
            .await?;
        read_json(response).await
    }
}

impl TelemetrySource for ThingsBoardSource {
    fn name(&self) -> &str {
        "thingsboard"
    }

    async fn fetch(&self) -> Result<TelemetryResponse, SourceError> {
        let raw = self.fetch_raw(now_ms()).await?;
        Ok(TelemetryResponse::from_value(raw)?)
    }
}
