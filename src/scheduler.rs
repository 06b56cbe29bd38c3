//! Fixed-interval timers driven by an explicit clock.
//!
//! The host calls [`Scheduler::poll`] from its own event loop. Each timer fires
//! at most once per poll, so a slow tick delays the next firing instead of
//! stacking up overlapping ones.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::{Result, SimError};

/// Throughput samples summed into one report.
pub const UPS_WINDOW: usize = 1;
/// Period of the throughput sampler.
pub const UPS_PERIOD: Duration = Duration::from_millis(1000 / UPS_WINDOW as u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Instant,
}

impl IntervalTimer {
    pub fn new(period: Duration, now: Instant) -> Self {
        IntervalTimer {
            period,
            next_due: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Returns true when the timer fired.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            // missed firings are dropped rather than replayed
            self.next_due = now + self.period;
        }
        true
    }
}

pub fn tick_period(tps: f64) -> Result<Duration> {
    if !tps.is_finite() || tps <= 0.0 {
        return Err(SimError::InvalidTps(tps));
    }
    Ok(Duration::from_secs_f64(1.0 / tps))
}

/// Which timers fired during a poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub tick: bool,
    pub sample: bool,
}

/// The tick timer and the throughput timer, started and stopped together.
#[derive(Debug, Default)]
pub struct Scheduler {
    tick: Option<IntervalTimer>,
    sampler: Option<IntervalTimer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    /// No-op when already running.
    pub fn start(&mut self, tps: f64, now: Instant) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let period = tick_period(tps)?;
        self.tick = Some(IntervalTimer::new(period, now));
        self.sampler = Some(IntervalTimer::new(UPS_PERIOD, now));
        Ok(())
    }

    /// Returns false when nothing was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.tick = None;
        self.sampler = None;
        was_running
    }

    pub fn restart(&mut self, tps: f64, now: Instant) -> Result<()> {
        let period = tick_period(tps)?;
        self.stop();
        self.tick = Some(IntervalTimer::new(period, now));
        self.sampler = Some(IntervalTimer::new(UPS_PERIOD, now));
        Ok(())
    }

    pub fn poll(&mut self, now: Instant) -> Due {
        Due {
            tick: self.tick.as_mut().is_some_and(|t| t.poll(now)),
            sample: self.sampler.as_mut().is_some_and(|t| t.poll(now)),
        }
    }

    pub fn tick_period(&self) -> Option<Duration> {
        self.tick.map(|t| t.period())
    }

    /// Earliest instant at which a timer is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.tick, self.sampler) {
            (Some(t), Some(s)) => Some(t.next_due().min(s.next_due())),
            (Some(t), None) => Some(t.next_due()),
            (None, Some(s)) => Some(s.next_due()),
            (None, None) => None,
        }
    }
}

/// Tick counts over the last [`UPS_WINDOW`] sampler firings.
#[derive(Debug, Default)]
pub struct ThroughputWindow {
    updates: u32,
    samples: VecDeque<u32>,
}

impl ThroughputWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_update(&mut self) {
        self.updates += 1;
    }

    /// Returns the windowed sum once enough samples have been collected.
    pub fn sample(&mut self) -> Option<u32> {
        self.samples.push_back(self.updates);
        self.updates = 0;
        if self.samples.len() > UPS_WINDOW {
            self.samples.pop_front();
        }
        (self.samples.len() == UPS_WINDOW).then(|| self.samples.iter().sum())
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
