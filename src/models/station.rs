// Push-path record (partial) and the station's current values

use serde::{Deserialize, Serialize};

/// Wind direction shown until the first push event arrives.
pub const UNKNOWN_DIRECTION: &str = "NA";

/// One push event payload. Any field may be absent; absent fields leave the
/// station's previous value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_out: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hum_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hum_out: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_avg: Option<f64>,
}

impl PushRecord {
    pub fn is_empty(&self) -> bool {
        *self == PushRecord::default()
    }
}

/// Current values of the push channels. No history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationState {
    pub temp_in: f64,
    pub temp_out: f64,
    pub hum_in: f64,
    pub hum_out: f64,
    pub pressure: f64,
    pub rainfall: f64,
    pub wind_direction: String,
    pub wind_speed: f64,
    pub wind_avg: f64,
}

impl Default for StationState {
    fn default() -> Self {
        Self {
            temp_in: 0.0,
            temp_out: 0.0,
            hum_in: 0.0,
            hum_out: 0.0,
            pressure: 0.0,
            rainfall: 0.0,
            wind_direction: UNKNOWN_DIRECTION.to_string(),
            wind_speed: 0.0,
            wind_avg: 0.0,
        }
    }
}

impl StationState {
    /// Overwrites every field present in `record`; the rest keep their values.
    pub fn merge(&mut self, record: &PushRecord) {
        fn set(slot: &mut f64, v: Option<f64>) {
            if let Some(v) = v {
                *slot = v;
            }
        }
        set(&mut self.temp_in, record.temp_in);
        set(&mut self.temp_out, record.temp_out);
        set(&mut self.hum_in, record.hum_in);
        set(&mut self.hum_out, record.hum_out);
        set(&mut self.pressure, record.pressure);
        set(&mut self.rainfall, record.rainfall);
        set(&mut self.wind_speed, record.wind_speed);
        set(&mut self.wind_avg, record.wind_avg);
        if let Some(dir) = &record.wind_direction {
            self.wind_direction.clone_from(dir);
        }
    }
}
