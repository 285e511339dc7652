use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

/// Frame counters at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Frames acquired from the source
    pub frames_seen: u64,
    /// Frames dropped because inference was in flight
    pub frames_dropped: u64,
    /// Frames passed to the colour converter
    pub frames_converted: u64,
    /// Frames handed to the inference worker
    pub frames_dispatched: u64,
    /// Frames given up on after a per-frame fault
    pub frames_abandoned: u64,
}

/// Counters plus the latest duration of each processing stage.
#[derive(Debug, Default)]
pub struct PipelineStats {
    counters: StatsSnapshot,
    last_stage: HashMap<&'static str, Duration>,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.counters
    }

    pub(crate) fn frame_seen(&mut self) {
        self.counters.frames_seen += 1;
    }

    pub(crate) fn frame_dropped(&mut self) {
        self.counters.frames_dropped += 1;
    }

    pub(crate) fn frame_converted(&mut self) {
        self.counters.frames_converted += 1;
    }

    pub(crate) fn frame_dispatched(&mut self) {
        self.counters.frames_dispatched += 1;
    }

    pub(crate) fn frame_abandoned(&mut self) {
        self.counters.frames_abandoned += 1;
    }

    pub fn record_stage(&mut self, name: &'static str, duration: Duration) {
        self.last_stage.insert(name, duration);
    }

    /// Most recent duration of `name`, if it has run.
    pub fn last_stage(&self, name: &str) -> Option<Duration> {
        self.last_stage.get(name).copied()
    }

    pub fn log_summary(&self) {
        let c = &self.counters;
        info!(
            seen = c.frames_seen,
            dropped = c.frames_dropped,
            dispatched = c.frames_dispatched,
            abandoned = c.frames_abandoned,
            "Stream summary"
        );
        let mut stages: Vec<_> = self.last_stage.iter().collect();
        stages.sort_by_key(|(name, _)| **name);
        for (name, duration) in stages {
            info!("{:<16} {:>10.3}ms", name, duration.as_secs_f64() * 1000.0);
        }
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_keeps_latest_duration() {
        let mut stats = PipelineStats::new();
        stats.record_stage("resample", Duration::from_millis(4));
        stats.record_stage("resample", Duration::from_millis(2));
        assert_eq!(stats.last_stage("resample"), Some(Duration::from_millis(2)));
        assert_eq!(stats.last_stage("convert_yuv"), None);
    }

    #[test]
    fn test_timer_reports_its_name() {
        let (name, duration) = Timer::start("fill_planes").stop();
        assert_eq!(name, "fill_planes");
        assert!(duration < Duration::from_secs(5));
    }
}
