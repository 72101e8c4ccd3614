// Per-channel bounded time series for the pull channels

use std::collections::BTreeMap;

use crate::models::{Channel, Origin, PULL_CHANNELS, Sample};

/// Trailing window kept per channel when none is configured.
pub const DEFAULT_WINDOW: usize = 720;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesStore {
    window: usize,
    series: BTreeMap<Channel, Vec<Sample>>,
}

impl TimeSeriesStore {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            series: PULL_CHANNELS.iter().map(|&c| (c, Vec::new())).collect(),
        }
    }

    /// Replaces a pull channel's series wholesale. Returns false (and changes
    /// nothing) for push channels, which keep no history.
    pub fn replace(&mut self, channel: Channel, samples: Vec<Sample>) -> bool {
        if channel.origin() != Origin::Pull {
            return false;
        }
        self.series.insert(channel, normalize(samples, self.window));
        true
    }

    pub fn series(&self, channel: Channel) -> &[Sample] {
        self.series.get(&channel).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &[Sample])> {
        self.series.iter().map(|(c, s)| (*c, s.as_slice()))
    }

    pub(crate) fn to_map(&self) -> BTreeMap<Channel, Vec<Sample>> {
        self.series.clone()
    }
}

impl Default for TimeSeriesStore {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Chronological order (stable for equal timestamps), trimmed to the newest `window` samples.
/// ThingsBoard answers newest-first, the mock endpoint oldest-first.
pub fn normalize(mut samples: Vec<Sample>, window: usize) -> Vec<Sample> {
    if !samples.is_sorted_by_key(|s| s.ts) {
        samples.sort_by_key(|s| s.ts);
    }
    if samples.len() > window {
        samples.drain(..samples.len() - window);
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_descending_input() {
        let out = normalize(
            vec![Sample::new(3, 3.0), Sample::new(1, 1.0), Sample::new(2, 2.0)],
            10,
        );
        let ts: Vec<i64> = out.iter().map(|s| s.ts).collect();
        assert_eq!(ts, vec![1, 2, 3]);
    }

    #[test]
    fn normalize_keeps_newest_window() {
        let samples = (0..10).map(|i| Sample::new(i, i as f64)).collect();
        let out = normalize(samples, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].ts, 7);
        assert_eq!(out[2].ts, 9);
    }

    #[test]
    fn replace_rejects_push_channels() {
        let mut store = TimeSeriesStore::new(5);
        assert!(!store.replace(Channel::Rainfall, vec![Sample::new(1, 1.0)]));
        assert!(store.series(Channel::Rainfall).is_empty());
        assert!(store.replace(Channel::Humidity, vec![Sample::new(1, 40.0)]));
        assert_eq!(store.series(Channel::Humidity).len(), 1);
    }

    #[test]
    fn replace_discards_previous_series() {
        let mut store = TimeSeriesStore::new(5);
        store.replace(
            Channel::Temperature,
            vec![Sample::new(1, 20.0), Sample::new(2, 21.0)],
        );
        store.replace(Channel::Temperature, vec![Sample::new(9, 30.0)]);
        assert_eq!(store.series(Channel::Temperature), &[Sample::new(9, 30.0)]);
    }
}
