//! Animation Scheduler
//!
//! Advances through the icon sequence at the interval picked by the policy.
//! Every published sample restarts the wait with the new interval, so the
//! animation speed follows the load instead of drifting on a fixed ticker.

use log::{debug, info, trace};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::animation::icons::IconSequence;
use crate::animation::policy::interval_for;
use crate::system::usage::UsageCell;
use crate::tray::PresentationSink;

/// Position in the icon sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleState {
    index: usize,
    len: usize,
}

impl CycleState {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Move to the next frame and return its index
    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1) % self.len;
        self.index
    }
}

pub struct AnimationScheduler {
    icons: IconSequence,
    cycle: CycleState,
    interval: Duration,
    usage: Arc<UsageCell>,
    sink: Arc<dyn PresentationSink>,
}

impl AnimationScheduler {
    pub fn new(icons: IconSequence, usage: Arc<UsageCell>, sink: Arc<dyn PresentationSink>) -> Self {
        let cycle = CycleState::new(icons.len());
        let interval = interval_for(usage.latest());
        Self { icons, cycle, interval, usage, sink }
    }

    /// Push frame 0. Done once before `run` starts the cadence.
    pub fn show_first_frame(&self) {
        self.sink.set_icon(self.icons.first());
    }

    fn advance(&mut self) {
        let index = self.cycle.advance();
        let frame = self.icons.get(index);
        trace!("Frame {} ({})", index, frame.name);
        self.sink.set_icon(frame);
    }

    /// Run the animation until the task is aborted
    pub async fn run(mut self) {
        info!(
            "Animation starting ({} frames, interval: {}ms)",
            self.icons.len(),
            self.interval.as_millis()
        );

        let sleep = time::sleep(self.interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => {
                    self.advance();
                    sleep.as_mut().reset(Instant::now() + self.interval);
                }
                () = self.usage.changed() => {
                    let interval = interval_for(self.usage.latest());
                    if interval != self.interval {
                        debug!("Animation interval {}ms -> {}ms",
                               self.interval.as_millis(), interval.as_millis());
                    }
                    self.interval = interval;
                    // Discard the partly elapsed period
                    sleep.as_mut().reset(Instant::now() + self.interval);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::icons::tests::sequence;
    use crate::system::usage::Utilization;
    use crate::tray::testing::RecordingSink;

    fn assert_close(actual: Duration, expected: Duration) {
        let diff = if actual > expected { actual - expected } else { expected - actual };
        assert!(diff <= Duration::from_millis(1), "expected {:?}, got {:?}", expected, actual);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut cycle = CycleState::new(3);
        for k in 1..=10 {
            assert_eq!(cycle.advance(), k % 3);
        }
    }

    #[test]
    fn test_single_frame_never_moves() {
        let mut cycle = CycleState::new(1);
        for _ in 0..5 {
            assert_eq!(cycle.advance(), 0);
        }
    }

    #[test]
    fn test_first_frame_is_pushed_synchronously() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = AnimationScheduler::new(
            sequence(&["A", "B", "C"]),
            Arc::new(UsageCell::new()),
            sink.clone(),
        );

        scheduler.show_first_frame();
        assert_eq!(sink.icon_names(), vec!["A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_cadence_cycles_frames() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = AnimationScheduler::new(
            sequence(&["A", "B", "C"]),
            Arc::new(UsageCell::new()),
            sink.clone(),
        );
        scheduler.show_first_frame();

        let start = Instant::now();
        let handle = tokio::spawn(scheduler.run());
        time::sleep(Duration::from_millis(850)).await;
        handle.abort();

        let icons = sink.icons();
        assert_eq!(sink.icon_names(), vec!["A", "B", "C", "A", "B"]);
        for (k, (at, _)) in icons.iter().enumerate().skip(1) {
            assert_close(*at - start, Duration::from_millis(200 * k as u64));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_resets_pending_advance() {
        let usage = Arc::new(UsageCell::new());
        let sink = Arc::new(RecordingSink::default());
        let scheduler = AnimationScheduler::new(sequence(&["A", "B", "C"]), usage.clone(), sink.clone());
        scheduler.show_first_frame();
        let handle = tokio::spawn(scheduler.run());

        // Halfway through the 200ms idle period the load jumps to 70%
        time::sleep(Duration::from_millis(100)).await;
        usage.publish(Utilization::from_raw(70.0));
        let sampled_at = Instant::now();

        time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        let icons = sink.icons();
        assert_eq!(sink.icon_names(), vec!["A", "B", "C"]);
        // 50ms after the sample, not the 100ms left of the old period
        assert_close(icons[1].0 - sampled_at, Duration::from_millis(50));
        assert_close(icons[2].0 - sampled_at, Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_frame_keeps_pushing_same_icon() {
        let usage = Arc::new(UsageCell::new());
        usage.publish(Utilization::from_raw(100.0));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = AnimationScheduler::new(sequence(&["only"]), usage, sink.clone());
        scheduler.show_first_frame();

        let handle = tokio::spawn(scheduler.run());
        time::sleep(Duration::from_millis(55)).await;
        handle.abort();

        let names = sink.icon_names();
        assert!(names.len() > 2);
        assert!(names.iter().all(|n| n == "only"));
    }
}
