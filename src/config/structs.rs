use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub icons: IconConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub tray: TrayConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Directory scanned once at startup for animation frames
    pub dir: PathBuf,
    /// File extension (without the dot) that marks a frame
    pub extension: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("resources"),
            extension: "ico".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Observation window of a single CPU measurement
    pub window_ms: u64,
    /// Nominal cadence between measurement starts
    pub interval_ms: u64,
}

impl SamplerConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn interval(&self) -> Duration {
        // interval() panics on a zero period
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window_ms: 5000,
            interval_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    pub title: String,
    /// Tooltip shown until the first sample completes
    pub placeholder_tooltip: String,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            title: "RunCat".to_string(),
            placeholder_tooltip: "请等待第一次扫描".to_string(),
        }
    }
}
