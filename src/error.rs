//! Error types for the countdown timer
//!
//! Nothing in the countdown core is fatal. These errors surface either as
//! rejected user input (a zero duration, an impossible clock time) or as a
//! failed notification channel, which the dispatcher records and moves past.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the countdown application
#[derive(Debug, Error)]
pub enum CountdownError {
    /// A duration countdown of zero seconds was requested
    #[error("countdown duration must be greater than zero")]
    ZeroDuration,

    /// A target clock time outside 00:00:00..=23:59:59
    #[error("invalid clock time {hours:02}:{minutes:02}:{seconds:02}")]
    InvalidClockTime {
        hours: u32,
        minutes: u32,
        seconds: u32,
    },

    /// The configured notification sound does not exist
    #[error("sound file not found: {}", .0.display())]
    SoundFileMissing(PathBuf),

    /// No audio player could be spawned for the sound file
    #[error("failed to start audio player: {0}")]
    Player(#[source] std::io::Error),

    /// Desktop notification could not be shown
    #[error("desktop notification failed: {0}")]
    Notification(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Logging could not be initialised
    #[error("logging setup failed: {0}")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for countdown operations
pub type Result<T> = std::result::Result<T, CountdownError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_error_is_zero_padded() {
        let err = CountdownError::InvalidClockTime {
            hours: 24,
            minutes: 5,
            seconds: 0,
        };
        assert_eq!(err.to_string(), "invalid clock time 24:05:00");
    }

    #[test]
    fn player_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "paplay");
        let err = CountdownError::Player(io);
        assert!(err.source().is_some());
    }
}
