// Dashboard state as a pure reducer: (DashboardState, Event) -> DashboardState

use std::collections::BTreeMap;

use super::alerts::{self, RULES};
use super::projector;
use super::store::TimeSeriesStore;
use crate::models::{
    Channel, DashboardSnapshot, PULL_CHANNELS, PushRecord, Sample, StationState,
    TelemetryResponse,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A pull source delivered a fresh series for one channel.
    SourceUpdated {
        channel: Channel,
        samples: Vec<Sample>,
    },
    /// The push subscription delivered a (possibly partial) record.
    PushUpdated(PushRecord),
}

impl Event {
    /// One `SourceUpdated` per pull channel; absent channels become empty series.
    pub fn from_response(response: TelemetryResponse) -> Vec<Event> {
        response
            .into_channels()
            .into_iter()
            .map(|(channel, samples)| Event::SourceUpdated { channel, samples })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    store: TimeSeriesStore,
    current: BTreeMap<Channel, f64>,
    alerts: BTreeMap<Channel, bool>,
    station: StationState,
    updated_at: Option<i64>,
}

impl DashboardState {
    /// Empty state: zero current values, no alerts raised, station fields at their sentinels.
    pub fn new(window: usize) -> Self {
        Self {
            store: TimeSeriesStore::new(window),
            current: PULL_CHANNELS.iter().map(|&c| (c, 0.0)).collect(),
            alerts: RULES.iter().map(|r| (r.channel, false)).collect(),
            station: StationState::default(),
            updated_at: None,
        }
    }

    pub fn apply(mut self, event: Event) -> Self {
        match event {
            Event::SourceUpdated { channel, samples } => {
                if self.store.replace(channel, samples) {
                    self.current = projector::project(&self.store);
                    self.alerts = alerts::evaluate_all(&self.current);
                }
            }
            Event::PushUpdated(record) => self.station.merge(&record),
        }
        self
    }

    /// Applies a batch of events as one update stamped with `at_ms`.
    pub fn apply_all(self, events: impl IntoIterator<Item = Event>, at_ms: i64) -> Self {
        let mut next = events.into_iter().fold(self, DashboardState::apply);
        next.updated_at = Some(at_ms);
        next
    }

    pub fn series(&self, channel: Channel) -> &[Sample] {
        self.store.series(channel)
    }

    pub fn current(&self, channel: Channel) -> f64 {
        self.current.get(&channel).copied().unwrap_or(0.0)
    }

    pub fn alert(&self, channel: Channel) -> bool {
        self.alerts.get(&channel).copied().unwrap_or(false)
    }

    pub fn alerts(&self) -> &BTreeMap<Channel, bool> {
        &self.alerts
    }

    pub fn station(&self) -> &StationState {
        &self.station
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            updated_at: self.updated_at,
            series: self.store.to_map(),
            current: self.current.clone(),
            alerts: self.alerts.clone(),
            station: self.station.clone(),
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(super::store::DEFAULT_WINDOW)
    }
}
