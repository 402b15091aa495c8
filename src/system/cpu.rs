//! CPU Sampler
//!
//! Measures global CPU utilization over a fixed observation window and
//! publishes the clamped result to the shared `UsageCell`.
//!
//! The window is awaited rather than slept on a blocking thread, so an aborted
//! sampler task stops even in the middle of a measurement.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tokio::time::{self, MissedTickBehavior};

use crate::config::structs::SamplerConfig;
use crate::system::usage::{UsageCell, Utilization};
use crate::tray::{usage_tooltip, PresentationSink};

/// Source of raw utilization readings.
///
/// A measurement is `begin()`, the observation window, then `finish()`,
/// which returns the average usage over the window as a percentage.
pub trait CpuProbe: Send {
    fn begin(&mut self) -> Result<()>;
    fn finish(&mut self) -> Result<f64>;
}

/// Probe backed by the `sysinfo` crate
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Result<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            bail!("CPU usage is not available on this platform");
        }

        let system = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::new().with_cpu_usage()),
        );
        if system.cpus().is_empty() {
            bail!("No CPUs reported by the operating system");
        }

        info!("CPU probe ready ({} logical CPUs)", system.cpus().len());
        Ok(Self { system })
    }
}

impl CpuProbe for SysinfoProbe {
    fn begin(&mut self) -> Result<()> {
        self.system.refresh_cpu_usage();
        Ok(())
    }

    fn finish(&mut self) -> Result<f64> {
        self.system.refresh_cpu_usage();
        Ok(self.system.global_cpu_usage() as f64)
    }
}

/// The sampling cadence
pub struct CpuSampler<P> {
    probe: P,
    window: Duration,
    cadence: Duration,
    usage: Arc<UsageCell>,
    sink: Arc<dyn PresentationSink>,
}

impl<P: CpuProbe> CpuSampler<P> {
    pub fn new(
        probe: P,
        config: &SamplerConfig,
        usage: Arc<UsageCell>,
        sink: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            probe,
            window: config.window(),
            cadence: config.interval(),
            usage,
            sink,
        }
    }

    /// Take one measurement over the observation window
    pub async fn sample(&mut self) -> Result<Utilization> {
        self.probe.begin().context("Failed to start CPU measurement")?;
        time::sleep(self.window).await;
        let raw = self.probe.finish().context("Failed to read CPU usage")?;

        if !raw.is_finite() {
            bail!("CPU probe returned a non-finite reading: {}", raw);
        }

        let sample = Utilization::from_raw(raw);
        debug!("CPU usage: {} (raw: {:.2}%)", sample, raw);
        Ok(sample)
    }

    /// Sample forever. Only returns on a probe failure, which is fatal.
    ///
    /// Ticks that fall inside a measurement are delayed instead of bursting,
    /// so the effective period is `max(window, cadence)` from each completion.
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Sampler starting (window: {}ms, cadence: {}ms)",
            self.window.as_millis(),
            self.cadence.as_millis()
        );

        let mut ticker = time::interval(self.cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let sample = self.sample().await?;
            self.usage.publish(sample);
            self.sink.set_tooltip(&usage_tooltip(sample));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tray::testing::RecordingSink;
    use anyhow::anyhow;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    /// Probe that replays fixed readings, then fails
    pub(crate) struct ScriptedProbe {
        readings: VecDeque<f64>,
    }

    impl ScriptedProbe {
        pub(crate) fn new(readings: &[f64]) -> Self {
            Self { readings: readings.iter().copied().collect() }
        }
    }

    impl CpuProbe for ScriptedProbe {
        fn begin(&mut self) -> Result<()> {
            Ok(())
        }

        fn finish(&mut self) -> Result<f64> {
            self.readings.pop_front().ok_or_else(|| anyhow!("probe exhausted"))
        }
    }

    fn config(window_ms: u64, interval_ms: u64) -> SamplerConfig {
        SamplerConfig { window_ms, interval_ms }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_waits_for_window_and_clamps() {
        let sink = Arc::new(RecordingSink::default());
        let mut sampler = CpuSampler::new(
            ScriptedProbe::new(&[99.7]),
            &config(5000, 1000),
            Arc::new(UsageCell::new()),
            sink,
        );

        let start = Instant::now();
        let sample = sampler.sample().await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(sample.percent(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_finite_reading_is_an_error() {
        let mut sampler = CpuSampler::new(
            ScriptedProbe::new(&[f64::NAN]),
            &config(10, 10),
            Arc::new(UsageCell::new()),
            Arc::new(RecordingSink::default()),
        );

        assert!(sampler.sample().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_publishes_and_updates_tooltip() {
        let usage = Arc::new(UsageCell::new());
        let sink = Arc::new(RecordingSink::default());
        let sampler = CpuSampler::new(
            ScriptedProbe::new(&[25.0, 63.4]),
            &config(1000, 1000),
            usage.clone(),
            sink.clone(),
        );

        let result = sampler.run().await;

        // Two readings, then the exhausted probe ends the cadence
        assert!(result.is_err());
        assert_eq!(usage.latest(), Some(Utilization::from_raw(63.4)));
        assert_eq!(
            sink.tooltips(),
            vec!["CPU 使用率: 25.0%".to_string(), "CPU 使用率: 63.4%".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_window_runs_back_to_back() {
        let usage = Arc::new(UsageCell::new());
        let sink = Arc::new(RecordingSink::default());
        let sampler = CpuSampler::new(
            ScriptedProbe::new(&[1.0, 2.0, 3.0]),
            &config(5000, 1000),
            usage,
            sink.clone(),
        );

        let start = Instant::now();
        let _ = sampler.run().await;

        // Three completed windows plus the failing fourth, no extra waits
        assert_eq!(start.elapsed(), Duration::from_secs(20));
        assert_eq!(sink.tooltips().len(), 3);
    }
}
