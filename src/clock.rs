//! Time sources and the periodic tick scheduler
//!
//! The countdown core never reads the system clock directly. It asks a
//! [`Clock`] for "now" and arms or disarms a [`Scheduler`]; the event loop
//! polls the [`Ticker`] to find out when the next tick is due.

use chrono::{NaiveTime, Timelike};
use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

const SECONDS_PER_DAY: f64 = 86_400.0;

// ============================================================================
// Clocks
// ============================================================================

/// Wall-clock source used by the countdown
pub trait Clock {
    /// Seconds since the Unix epoch, with sub-second precision
    fn now(&self) -> f64;

    /// Current local time of day
    fn time_of_day(&self) -> NaiveTime;
}

/// The machine's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        chrono::Local::now().timestamp_micros() as f64 / 1_000_000.0
    }

    fn time_of_day(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// Hand-driven clock; clones share the same instant.
///
/// Time of day is derived from `now` as if the epoch were local midnight,
/// so `now = 36_000.0` reads as 10:00:00.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn time_of_day(&self) -> NaiveTime {
        let secs = self.now.get().rem_euclid(SECONDS_PER_DAY);
        let whole = secs.trunc();
        let nanos = ((secs - whole) * 1e9) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(whole as u32, nanos.min(999_999_999))
            .unwrap_or_default()
    }
}

/// Seconds since midnight, dropping the fractional part.
pub fn whole_seconds_of_day(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight()
}

// ============================================================================
// Scheduler
// ============================================================================

/// A restartable periodic trigger.
///
/// Only arming state lives here. Whoever owns the event loop decides when to
/// look at it and runs the tick callback between other work, so a tick is
/// never interrupted, only prevented from being scheduled again.
pub trait Scheduler {
    /// Arm (or re-arm) periodic ticking at `interval`
    fn schedule(&mut self, interval: Duration);

    /// Stop scheduling future ticks
    fn cancel(&mut self);

    fn is_scheduled(&self) -> bool;
}

/// `Instant`-based scheduler polled from the terminal event loop
#[derive(Debug, Default)]
pub struct Ticker {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once per elapsed interval while armed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match (self.interval, self.next_due) {
            (Some(interval), Some(due)) if now >= due => {
                // Skip missed ticks instead of replaying them in a burst.
                let mut next = due + interval;
                if next <= now {
                    next = now + interval;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }

    /// How long the event loop may block before the next tick is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

impl Scheduler for Ticker {
    fn schedule(&mut self, interval: Duration) {
        self.interval = Some(interval);
        self.next_due = Some(Instant::now() + interval);
    }

    fn cancel(&mut self) {
        self.interval = None;
        self.next_due = None;
    }

    fn is_scheduled(&self) -> bool {
        self.next_due.is_some()
    }
}
