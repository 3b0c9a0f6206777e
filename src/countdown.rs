//! Countdown session and timer
//!
//! A [`CountdownSession`] is a pair of wall-clock timestamps plus a run
//! state. The [`CountdownTimer`] owns the current session, replaces it on
//! every new start, and arms its [`Scheduler`] while the session runs.

use chrono::NaiveTime;
use std::{fmt, time::Duration};
use tracing::{debug, info};

use crate::{
    clock::{Clock, Scheduler, whole_seconds_of_day},
    error::{CountdownError, Result},
};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(100);
pub const SECONDS_PER_DAY: u64 = 86_400;

// ============================================================================
// Display values
// ============================================================================

/// Hours/minutes/seconds split of a whole number of seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    pub fn from_secs(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for TimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Elapsed share of the whole countdown, 0..=100
    Percent(f64),
    /// Countdown finished; the bar shows a busy state
    Indeterminate,
}

/// Everything the presentation layer needs for one refresh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub time: TimeParts,
    pub progress: Progress,
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunState {
    Running,
    /// Frozen at pause time; wall-clock time does not move the session.
    Paused { remaining: f64, elapsed: f64 },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Paused,
    Completed,
}

/// One countdown, from start to completion. `end > start` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSession {
    start: f64,
    end: f64,
    state: RunState,
}

impl CountdownSession {
    /// `duration_secs` must be non-zero; the timer rejects zero before this.
    fn begin(now: f64, duration_secs: u64) -> Self {
        Self {
            start: now,
            end: now + duration_secs as f64,
            state: RunState::Running,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn paused_remaining(&self) -> Option<f64> {
        match self.state {
            RunState::Paused { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    pub fn status(&self) -> Status {
        match self.state {
            RunState::Running => Status::Running,
            RunState::Paused { .. } => Status::Paused,
            RunState::Completed => Status::Completed,
        }
    }

    /// Length of the countdown as set at start (or reconstructed on resume)
    pub fn total(&self) -> f64 {
        self.end - self.start
    }

    /// Seconds left, never negative
    pub fn remaining(&self, now: f64) -> f64 {
        match self.state {
            RunState::Running => (self.end - now).max(0.0),
            RunState::Paused { remaining, .. } => remaining.max(0.0),
            RunState::Completed => 0.0,
        }
    }

    /// Elapsed share of the countdown in percent.
    ///
    /// Divides by the full duration rather than by what is left, so the value
    /// only grows while the session runs.
    pub fn progress(&self, now: f64) -> f64 {
        let elapsed = match self.state {
            RunState::Running => now - self.start,
            RunState::Paused { elapsed, .. } => elapsed,
            RunState::Completed => return 100.0,
        };
        (100.0 * elapsed / self.total()).clamp(0.0, 100.0)
    }

    pub fn frame(&self, now: f64) -> Frame {
        match self.state {
            RunState::Completed => Frame {
                time: TimeParts::default(),
                progress: Progress::Indeterminate,
            },
            _ => Frame {
                // ceil first, then integer division: 4.9s left reads 00:00:05
                time: TimeParts::from_secs(self.remaining(now).ceil() as u64),
                progress: Progress::Percent(self.progress(now)),
            },
        }
    }

    fn is_due(&self, now: f64) -> bool {
        self.is_running() && now >= self.end
    }

    fn pause(&mut self, now: f64) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = RunState::Paused {
            remaining: self.end - now,
            elapsed: now - self.start,
        };
        true
    }

    fn resume(&mut self, now: f64) -> bool {
        let RunState::Paused { remaining, elapsed } = self.state else {
            return false;
        };
        (self.start, self.end) = resumed_bounds(now, remaining, elapsed);
        self.state = RunState::Running;
        true
    }
}

/// Seconds from `now` until the next occurrence of `target` time of day.
///
/// Both times are taken at whole-second resolution. A target equal to now
/// means the same instant tomorrow, never a zero-length countdown.
pub fn duration_until(now: NaiveTime, target: NaiveTime) -> u64 {
    let diff = i64::from(whole_seconds_of_day(target)) - i64::from(whole_seconds_of_day(now));
    let secs = if diff <= 0 {
        diff + SECONDS_PER_DAY as i64
    } else {
        diff
    };
    secs as u64
}

/// New `(start, end)` for a session resumed at `now`.
///
/// Keeps both the elapsed and the remaining part captured at pause time, so
/// the progress fraction and the remaining time look the same as before.
pub fn resumed_bounds(now: f64, remaining: f64, elapsed: f64) -> (f64, f64) {
    (now - elapsed, now + remaining)
}

// ============================================================================
// Timer
// ============================================================================

/// Outcome of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// No running session; nothing to refresh
    Idle,
    Update(Frame),
    /// The session just reached its end. Returned once per session.
    Completed(Frame),
}

pub struct CountdownTimer<C: Clock, S: Scheduler> {
    clock: C,
    scheduler: S,
    interval: Duration,
    session: Option<CountdownSession>,
}

impl<C: Clock, S: Scheduler> CountdownTimer<C, S> {
    pub fn new(clock: C, scheduler: S, interval: Duration) -> Self {
        Self {
            clock,
            scheduler,
            interval,
            session: None,
        }
    }

    /// Start counting down `hours:minutes:seconds` from now.
    pub fn start_duration(&mut self, hours: u32, minutes: u32, seconds: u32) -> Result<()> {
        let total = u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds);
        if total == 0 {
            return Err(CountdownError::ZeroDuration);
        }
        self.begin(total);
        Ok(())
    }

    /// Start counting down to the next `hours:minutes:seconds` on the clock.
    pub fn start_at(&mut self, hours: u32, minutes: u32, seconds: u32) -> Result<()> {
        let target = NaiveTime::from_hms_opt(hours, minutes, seconds).ok_or(
            CountdownError::InvalidClockTime {
                hours,
                minutes,
                seconds,
            },
        )?;
        let total = duration_until(self.clock.time_of_day(), target);
        self.begin(total);
        Ok(())
    }

    fn begin(&mut self, duration_secs: u64) {
        self.scheduler.cancel();
        let session = CountdownSession::begin(self.clock.now(), duration_secs);
        info!(
            duration = %TimeParts::from_secs(duration_secs),
            end = session.end(),
            "countdown started"
        );
        self.session = Some(session);
        self.scheduler.schedule(self.interval);
    }

    /// Scheduler callback: derive display values, detect completion.
    pub fn tick(&mut self) -> Tick {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return Tick::Idle;
        };
        if !session.is_running() {
            return Tick::Idle;
        }

        if session.is_due(now) {
            session.state = RunState::Completed;
            self.scheduler.cancel();
            info!("countdown finished");
            return Tick::Completed(session.frame(now));
        }

        let frame = session.frame(now);
        debug!(time = %frame.time, "tick");
        Tick::Update(frame)
    }

    /// Freeze the running session. Returns `false` (no-op) in any other state.
    pub fn pause(&mut self) -> bool {
        let now = self.clock.now();
        let paused = self.session.as_mut().is_some_and(|s| s.pause(now));
        if paused {
            self.scheduler.cancel();
            info!(remaining = self.remaining(), "countdown paused");
        }
        paused
    }

    /// Continue a paused session. Returns `false` (no-op) in any other state.
    pub fn resume(&mut self) -> bool {
        let now = self.clock.now();
        let resumed = self.session.as_mut().is_some_and(|s| s.resume(now));
        if resumed {
            self.scheduler.schedule(self.interval);
            info!(remaining = self.remaining(), "countdown resumed");
        }
        resumed
    }

    /// Pause when running, resume when paused.
    pub fn toggle_pause(&mut self) -> bool {
        match self.status() {
            Status::Running => self.pause(),
            Status::Paused => self.resume(),
            Status::Idle | Status::Completed => false,
        }
    }

    pub fn status(&self) -> Status {
        self.session
            .as_ref()
            .map_or(Status::Idle, CountdownSession::status)
    }

    pub fn session(&self) -> Option<&CountdownSession> {
        self.session.as_ref()
    }

    /// Current display values without advancing anything
    pub fn snapshot(&self) -> Option<Frame> {
        let now = self.clock.now();
        self.session.as_ref().map(|s| s.frame(now))
    }

    pub fn remaining(&self) -> f64 {
        let now = self.clock.now();
        self.session.as_ref().map_or(0.0, |s| s.remaining(now))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect the next time ticking is (re)armed.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
