// Pull adapter for any endpoint serving the channel map

use super::{TelemetrySource, read_json};
use crate::error::SourceError;
use crate::models::TelemetryResponse;

pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl TelemetrySource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> Result<TelemetryResponse, SourceError> {
        let response = self.client.get(&self.url).send().await?;
        let raw: serde_json::Value = read_json(response).await?;
        Ok(TelemetryResponse::from_value(raw)?)
    }
}
