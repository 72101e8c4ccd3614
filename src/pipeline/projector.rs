// Current-value projection

use std::collections::BTreeMap;

use super::store::TimeSeriesStore;
use crate::models::{Channel, Sample};

/// Value of the chronologically last sample, or 0 for an empty series.
pub fn latest_value(series: &[Sample]) -> f64 {
    series.last().map_or(0.0, |s| s.value)
}

pub fn project(store: &TimeSeriesStore) -> BTreeMap<Channel, f64> {
    store
        .iter()
        .map(|(channel, series)| (channel, latest_value(series)))
        .collect()
}
