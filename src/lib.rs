//! Countdown - a terminal countdown timer
//!
//! Counts down a duration or to a clock time, with pause/resume and
//! end-of-countdown notifications (desktop balloon, sound, popup).

pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod dialog;
pub mod error;
pub mod logging;
pub mod notify;
pub mod ui;

pub use error::{CountdownError, Result};
