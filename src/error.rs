// Ingestion-boundary failures. Every variant is logged and the cycle skipped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to telemetry source failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telemetry source returned HTTP {0}")]
    Status(u16),

    #[error("malformed telemetry body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("ThingsBoard credentials not configured")]
    MissingCredentials,

    #[error("push stream ended: {0}")]
    StreamClosed(String),
}
