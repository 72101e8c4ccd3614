// Published dashboard view (HTTP + WebSocket wire format)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Channel, Sample, StationState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Time of the last applied pull cycle or push event (ms since epoch); None before any data.
    pub updated_at: Option<i64>,
    pub series: BTreeMap<Channel, Vec<Sample>>,
    pub current: BTreeMap<Channel, f64>,
    pub alerts: BTreeMap<Channel, bool>,
    pub station: StationState,
}
