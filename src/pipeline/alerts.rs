// Threshold rules and alert evaluation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRule {
    pub channel: Channel,
    pub bound: f64,
    pub direction: Direction,
}

impl ThresholdRule {
    pub const fn above(channel: Channel, bound: f64) -> Self {
        Self {
            channel,
            bound,
            direction: Direction::Above,
        }
    }

    pub const fn below(channel: Channel, bound: f64) -> Self {
        Self {
            channel,
            bound,
            direction: Direction::Below,
        }
    }

    /// Strict comparison: a value equal to the bound never alerts.
    pub fn evaluate(&self, value: f64) -> bool {
        match self.direction {
            Direction::Above => value > self.bound,
            Direction::Below => value < self.bound,
        }
    }
}

/// °C, %, km/h, hPa.
pub const RULES: [ThresholdRule; 4] = [
    ThresholdRule::above(Channel::Temperature, 25.0),
    ThresholdRule::above(Channel::Humidity, 60.0),
    ThresholdRule::above(Channel::WindSpeed, 10.0),
    ThresholdRule::below(Channel::Pressure, 1010.0),
];

pub fn rule_for(channel: Channel) -> Option<&'static ThresholdRule> {
    RULES.iter().find(|r| r.channel == channel)
}

/// One flag per rule. A channel missing from `current` is evaluated as 0.
pub fn evaluate_all(current: &BTreeMap<Channel, f64>) -> BTreeMap<Channel, bool> {
    RULES
        .iter()
        .map(|rule| {
            let value = current.get(&rule.channel).copied().unwrap_or(0.0);
            (rule.channel, rule.evaluate(value))
        })
        .collect()
}
