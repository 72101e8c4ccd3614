// Synthetic pull source: an independently generated hour of plausible readings per call

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{TelemetrySource, now_ms};
use crate::error::SourceError;
use crate::models::{Channel, Sample, TelemetryResponse};

/// Points per channel (one hour at one-minute resolution).
pub const DATA_POINTS: usize = 60;
pub const SAMPLE_SPACING_MS: i64 = 60_000;

/// Random walk parameters for one channel.
struct Walk {
    channel: Channel,
    start: f64,
    step: f64,
    precision: i32,
    min: f64,
    max: f64,
}

const WALKS: [Walk; 4] = [
    Walk {
        channel: Channel::Temperature,
        start: 23.5,
        step: 0.5,
        precision: 2,
        min: 18.0,
        max: 35.0,
    },
    Walk {
        channel: Channel::Humidity,
        start: 55.0,
        step: 2.0,
        precision: 1,
        min: 30.0,
        max: 95.0,
    },
    Walk {
        channel: Channel::WindSpeed,
        start: 8.0,
        step: 1.0,
        precision: 1,
        min: 0.0,
        max: 25.0,
    },
    Walk {
        channel: Channel::Pressure,
        start: 1013.0,
        step: 0.5,
        precision: 1,
        min: 970.0,
        max: 1040.0,
    },
];

/// Overwrites the trailing readings of a channel to push it past its alert bound.
struct Spike {
    channel: Channel,
    probability: f64,
    trailing: usize,
    floor: f64,
    spread: f64,
}

const SPIKES: [Spike; 3] = [
    Spike {
        channel: Channel::Temperature,
        probability: 0.5,
        trailing: 5,
        floor: 27.0,
        spread: 5.0,
    },
    Spike {
        channel: Channel::Humidity,
        probability: 0.4,
        trailing: 7,
        floor: 62.0,
        spread: 15.0,
    },
    Spike {
        channel: Channel::WindSpeed,
        probability: 0.3,
        trailing: 3,
        floor: 11.0,
        spread: 8.0,
    },
];

/// Inclusive range every generated value of `channel` falls in.
pub fn clamp_range(channel: Channel) -> Option<(f64, f64)> {
    WALKS
        .iter()
        .find(|w| w.channel == channel)
        .map(|w| (w.min, w.max))
}

/// `count` ascending timestamps spaced `spacing_ms` apart, the last one equal to `end_ms`.
pub fn timestamps(count: usize, end_ms: i64, spacing_ms: i64) -> Vec<i64> {
    (0..count as i64)
        .rev()
        .map(|back| end_ms - back * spacing_ms)
        .collect()
}

fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

fn random_value<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, precision: i32) -> f64 {
    round_to(rng.gen_range(min..max), precision)
}

/// One hour of readings ending at `end_ms`. Every call starts the walk from the
/// same base values, so consecutive calls are unrelated.
pub fn generate<R: Rng + ?Sized>(end_ms: i64, rng: &mut R) -> TelemetryResponse {
    let ts = timestamps(DATA_POINTS, end_ms, SAMPLE_SPACING_MS);
    let mut response = TelemetryResponse::default();
    let mut levels: Vec<f64> = WALKS.iter().map(|w| w.start).collect();

    for &t in &ts {
        for (walk, level) in WALKS.iter().zip(levels.iter_mut()) {
            *level += random_value(rng, -walk.step, walk.step, walk.precision);
            *level = level.clamp(walk.min, walk.max);
            if let Some(series) = response.series_mut(walk.channel) {
                series.push(Sample::new(t, *level));
            }
        }
    }

    for spike in &SPIKES {
        if !rng.gen_bool(spike.probability) {
            continue;
        }
        let floor = spike.floor;
        let spread = spike.spread;
        if let Some(series) = response.series_mut(spike.channel) {
            let from = series.len().saturating_sub(spike.trailing);
            for sample in &mut series[from..] {
                sample.value = floor + random_value(rng, 0.0, spread, 1);
            }
        }
    }

    response
}

/// Pull adapter over [`generate`], for running without a live backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSource;

impl TelemetrySource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> Result<TelemetryResponse, SourceError> {
        let mut rng = StdRng::from_entropy();
        Ok(generate(now_ms(), &mut rng))
    }
}
