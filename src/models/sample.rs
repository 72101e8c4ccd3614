// Time-series samples and the pull-source response body

use serde::{Deserialize, Deserializer, Serialize};

use super::{Channel, PULL_CHANNELS};

/// One reading of a pull channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub value: f64,
}

impl Sample {
    pub fn new(ts: i64, value: f64) -> Self {
        Self { ts, value }
    }
}

/// ThingsBoard serves timeseries values as strings ("23.5"); the mock endpoint serves numbers.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid sample value {s:?}: {e}"))),
    }
}

/// Body served by `/api/mock-telemetry` and the ThingsBoard timeseries endpoint.
/// Unknown keys are ignored; an absent key decodes as an empty series as long as
/// at least one pull key is present (see [`TelemetryResponse::from_value`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryResponse {
    #[serde(default)]
    pub temperature: Vec<Sample>,
    #[serde(default)]
    pub humidity: Vec<Sample>,
    #[serde(default)]
    pub wind_speed: Vec<Sample>,
    #[serde(default)]
    pub pressure: Vec<Sample>,
}

impl TelemetryResponse {
    /// Decodes an upstream body. Only a JSON object carrying at least one pull
    /// channel key is accepted; error bodies and arrays are malformed.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        let Some(map) = value.as_object() else {
            return Err(serde_json::Error::custom(
                "expected an object of channel series",
            ));
        };
        if !PULL_CHANNELS.iter().any(|c| map.contains_key(c.native_name())) {
            return Err(serde_json::Error::custom("no pull channel keys in body"));
        }
        serde_json::from_value(value)
    }

    /// Series for a pull channel; push channels have no series.
    pub fn series(&self, channel: Channel) -> &[Sample] {
        match channel {
            Channel::Temperature => &self.temperature,
            Channel::Humidity => &self.humidity,
            Channel::WindSpeed => &self.wind_speed,
            Channel::Pressure => &self.pressure,
            _ => &[],
        }
    }

    pub fn series_mut(&mut self, channel: Channel) -> Option<&mut Vec<Sample>> {
        match channel {
            Channel::Temperature => Some(&mut self.temperature),
            Channel::Humidity => Some(&mut self.humidity),
            Channel::WindSpeed => Some(&mut self.wind_speed),
            Channel::Pressure => Some(&mut self.pressure),
            _ => None,
        }
    }

    /// Consumes the response into (channel, series) pairs in registry order.
    pub fn into_channels(self) -> [(Channel, Vec<Sample>); 4] {
        [
            (Channel::Temperature, self.temperature),
            (Channel::Humidity, self.humidity),
            (Channel::WindSpeed, self.wind_speed),
            (Channel::Pressure, self.pressure),
        ]
    }
}
