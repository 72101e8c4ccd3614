// Domain models: samples, channel registry, push records, dashboard snapshots

mod channel;
mod sample;
mod snapshot;
mod station;

pub use channel::{Channel, Origin, PULL_CHANNELS, PUSH_CHANNELS};
pub use sample::{Sample, TelemetryResponse};
pub use snapshot::DashboardSnapshot;
pub use station::{PushRecord, StationState, UNKNOWN_DIRECTION};
