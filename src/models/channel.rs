// Channel registry: one normalized identifier per metric, mapped to each source's wire name

use serde::{Deserialize, Serialize};

/// Which ingestion path owns a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Pull,
    Push,
}

/// Every metric the dashboard knows about. Pull and push sources map their
/// native field names onto these; the two sets never overlap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Temperature,
    Humidity,
    WindSpeed,
    Pressure,
    IndoorTemperature,
    OutdoorTemperature,
    IndoorHumidity,
    OutdoorHumidity,
    StationPressure,
    Rainfall,
    WindDirection,
    StationWindSpeed,
    WindAverage,
}

pub const PULL_CHANNELS: [Channel; 4] = [
    Channel::Temperature,
    Channel::Humidity,
    Channel::WindSpeed,
    Channel::Pressure,
];

pub const PUSH_CHANNELS: [Channel; 9] = [
    Channel::IndoorTemperature,
    Channel::OutdoorTemperature,
    Channel::IndoorHumidity,
    Channel::OutdoorHumidity,
    Channel::StationPressure,
    Channel::Rainfall,
    Channel::WindDirection,
    Channel::StationWindSpeed,
    Channel::WindAverage,
];

impl Channel {
    pub fn origin(self) -> Origin {
        match self {
            Channel::Temperature | Channel::Humidity | Channel::WindSpeed | Channel::Pressure => {
                Origin::Pull
            }
            _ => Origin::Push,
        }
    }

    /// Field name used on the wire by the owning source.
    pub fn native_name(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::WindSpeed => "windSpeed",
            Channel::Pressure => "pressure",
            Channel::IndoorTemperature => "tempIn",
            Channel::OutdoorTemperature => "tempOut",
            Channel::IndoorHumidity => "humIn",
            Channel::OutdoorHumidity => "humOut",
            Channel::StationPressure => "pressure",
            Channel::Rainfall => "rainfall",
            Channel::WindDirection => "windDirection",
            Channel::StationWindSpeed => "windSpeed",
            Channel::WindAverage => "windAvg",
        }
    }

    /// Resolve a source's native field name. `pressure` and `windSpeed` exist in
    /// both catalogs, so the origin decides which channel they mean.
    pub fn from_native(origin: Origin, name: &str) -> Option<Self> {
        let catalog: &[Channel] = match origin {
            Origin::Pull => &PULL_CHANNELS,
            Origin::Push => &PUSH_CHANNELS,
        };
        catalog.iter().copied().find(|c| c.native_name() == name)
    }
}
