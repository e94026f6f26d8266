//! Timing utilities for the driver phases.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::{log_enabled, Level};

/// Execute the given closure while timing it, and pass the duration to the
/// second closure. Nothing is measured unless `level` is enabled.
#[inline(always)]
pub fn timed<T>(op: impl FnOnce() -> T, level: Level, on_elapsed: impl FnOnce(Duration)) -> T {
    if log_enabled!(level) {
        let begin = Instant::now();
        let result = op();
        on_elapsed(begin.elapsed());
        result
    } else {
        op()
    }
}

/// How long each named driver phase took, in the order the phases first ran.
#[derive(Debug, Default, Clone)]
pub struct PhaseTimings {
    timings: IndexMap<&'static str, Duration>,
}

impl PhaseTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a phase. Repeated phases are accumulated into the first entry.
    pub fn record(&mut self, name: &'static str, time: Duration) {
        self.timings.entry(name).and_modify(|e| *e += time).or_insert(time);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.timings.iter().map(|(name, time)| (*name, *time))
    }

    pub fn total(&self) -> Duration {
        self.timings.values().sum()
    }

    /// Emit every recorded phase as a `debug` log record.
    pub fn report(&self) {
        for (name, time) in self.iter() {
            log::debug!("{name:<10} {time:?}");
        }
    }
}
