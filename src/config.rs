use serde::Deserialize;

use crate::pipeline::store::DEFAULT_WINDOW;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub thingsboard: ThingsBoardConfig,
    #[serde(default)]
    pub push: PushConfig,
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Which pull adapter feeds the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// In-process synthetic generator.
    Mock,
    /// ThingsBoard timeseries API, using the `[thingsboard]` credentials.
    Thingsboard,
    /// Any URL serving the channel map (e.g. another instance's /api/telemetry).
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_source")]
    pub source: SourceKind,
    /// Required when source = "http".
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Trailing samples kept per channel.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// How often to log cycle counters at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_source() -> SourceKind {
    SourceKind::Mock
}

fn default_interval_ms() -> u64 {
    10_000
}

fn default_max_points() -> usize {
    DEFAULT_WINDOW
}

fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            endpoint: None,
            interval_ms: default_interval_ms(),
            max_points: default_max_points(),
            request_timeout_ms: default_request_timeout_ms(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThingsBoardConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default = "default_tb_api_url")]
    pub api_url: String,
}

fn default_tb_api_url() -> String {
    "https://demo.thingsboard.io".into()
}

impl Default for ThingsBoardConfig {
    fn default() -> Self {
        Self {
            token: None,
            device_id: None,
            api_url: default_tb_api_url(),
        }
    }
}

impl ThingsBoardConfig {
    /// Token and device id, if both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.token.as_deref().filter(|s| !s.is_empty())?;
        let device = self.device_id.as_deref().filter(|s| !s.is_empty())?;
        Some((token, device))
    }

    /// TB_TOKEN, TB_DEVICE_ID and TB_API_URL take precedence over the file.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("TB_TOKEN") {
            self.token = Some(v);
        }
        if let Ok(v) = std::env::var("TB_DEVICE_ID") {
            self.device_id = Some(v);
        }
        if let Ok(v) = std::env::var("TB_API_URL")
            && !v.is_empty()
        {
            self.api_url = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Realtime Database root, e.g. https://<project>.firebaseio.com
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_push_path")]
    pub path: String,
    /// Database secret or ID token, sent as the `auth` query parameter.
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_push_path() -> String {
    "telemetry".into()
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database_url: String::new(),
            path: default_push_path(),
            auth: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of dashboard snapshots kept in the broadcast channel for /ws/dashboard (slow clients may lag).
    pub broadcast_capacity: usize,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        let mut config: AppConfig = toml::from_str(&s)?;
        config.thingsboard.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests). Environment overrides are not applied.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.poller.interval_ms > 0,
            "poller.interval_ms must be > 0, got {}",
            self.poller.interval_ms
        );
        anyhow::ensure!(
            self.poller.max_points > 0,
            "poller.max_points must be > 0, got {}",
            self.poller.max_points
        );
        anyhow::ensure!(
            self.poller.request_timeout_ms > 0,
            "poller.request_timeout_ms must be > 0, got {}",
            self.poller.request_timeout_ms
        );
        anyhow::ensure!(
            self.poller.stats_log_interval_secs > 0,
            "poller.stats_log_interval_secs must be > 0, got {}",
            self.poller.stats_log_interval_secs
        );
        if self.poller.source == SourceKind::Http {
            anyhow::ensure!(
                self.poller
                    .endpoint
                    .as_deref()
                    .is_some_and(|e| !e.is_empty()),
                "poller.endpoint must be set when poller.source = \"http\""
            );
        }
        anyhow::ensure!(
            !self.thingsboard.api_url.is_empty(),
            "thingsboard.api_url must be non-empty"
        );
        if self.push.enabled {
            anyhow::ensure!(
                !self.push.database_url.is_empty(),
                "push.database_url must be non-empty when push.enabled = true"
            );
            anyhow::ensure!(
                self.push.reconnect_delay_ms > 0,
                "push.reconnect_delay_ms must be > 0, got {}",
                self.push.reconnect_delay_ms
            );
        }
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        Ok(())
    }
}
