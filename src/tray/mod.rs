//! Presentation surface for the animated status icon
//!
//! The scheduler and sampler only talk to a `PresentationSink`; what draws the
//! icon is up to the implementation.

pub mod console;

use crate::animation::icons::Frame;
use crate::system::usage::Utilization;

/// Receives icon and tooltip updates
pub trait PresentationSink: Send + Sync {
    fn set_icon(&self, frame: &Frame);
    fn set_tooltip(&self, text: &str);
    /// Called once during teardown; later updates are ignored
    fn release(&self);
}

/// Tooltip text for a utilization sample
pub fn usage_tooltip(usage: Utilization) -> String {
    format!("CPU 使用率: {:.1}%", usage.percent())
}
