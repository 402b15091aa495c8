//! Interval Policy: CPU utilization to frame interval, in discrete tiers

use std::time::Duration;

use crate::system::usage::Utilization;

/// `(usage upper bound, exclusive; interval in ms)`, first match wins
const TIERS: [(f64, u64); 4] = [
    (40.0, 200),
    (60.0, 100),
    (80.0, 50),
    (100.0, 20),
];

/// Interval at full load
const SATURATED_MS: u64 = 10;

pub fn frame_interval(percent: f64) -> Duration {
    let ms = TIERS
        .iter()
        .find(|(bound, _)| percent < *bound)
        .map(|(_, ms)| *ms)
        .unwrap_or(SATURATED_MS);
    Duration::from_millis(ms)
}

/// Interval for the latest sample. Before the first sample the load is taken as 0%.
pub fn interval_for(sample: Option<Utilization>) -> Duration {
    frame_interval(sample.map(Utilization::percent).unwrap_or(0.0))
}
