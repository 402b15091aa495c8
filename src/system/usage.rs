//! Shared CPU utilization value
//!
//! Written only by the sampler, read by the animation scheduler and the tray.
//! The value lives in an `AtomicU64` so readers never see a torn `f64`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Notify;

/// Raw readings at or above this are reported as a full 100%
const FULL_LOAD_THRESHOLD: f64 = 99.5;

/// Bit pattern stored before the first sample. It is a NaN, which
/// `Utilization` never holds.
const NO_SAMPLE: u64 = u64::MAX;

/// CPU utilization percentage in [0, 100], already clamped
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Utilization(f64);

impl Utilization {
    pub fn from_raw(raw: f64) -> Self {
        if raw >= FULL_LOAD_THRESHOLD {
            Self(100.0)
        } else {
            Self(raw.max(0.0))
        }
    }

    pub fn percent(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Latest utilization sample plus a wake-up for whoever follows it
pub struct UsageCell {
    bits: AtomicU64,
    changed: Notify,
}

impl UsageCell {
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(NO_SAMPLE),
            changed: Notify::new(),
        }
    }

    /// Store a new sample and wake the follower
    pub fn publish(&self, sample: Utilization) {
        self.bits.store(sample.0.to_bits(), Ordering::Release);
        self.changed.notify_one();
    }

    /// Latest sample, `None` until the first measurement completes
    pub fn latest(&self) -> Option<Utilization> {
        match self.bits.load(Ordering::Acquire) {
            NO_SAMPLE => None,
            bits => Some(Utilization(f64::from_bits(bits))),
        }
    }

    /// Resolves once a sample is published. A publish that happens while
    /// nobody is waiting is remembered for the next call.
    pub async fn changed(&self) {
        self.changed.notified().await;
    }
}

impl Default for UsageCell {
    fn default() -> Self {
        Self::new()
    }
}
