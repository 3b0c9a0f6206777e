//! Command-line arguments

use chrono::NaiveTime;
use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Parser, Clone, Debug)]
#[command(name = "countdown", author, version, about = "⏳ countdown - A terminal countdown timer")]
pub struct Args {
    /// Start a countdown of this length right away (e.g. 1h30m, 90s, 2m5s)
    #[arg(short, long, value_parser = parse_duration, conflicts_with = "at")]
    pub duration: Option<u32>,

    /// Count down to the next occurrence of a clock time (HH:MM or HH:MM:SS)
    #[arg(short, long, value_parser = parse_clock_time)]
    pub at: Option<NaiveTime>,

    /// Refresh interval in milliseconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(10..=60_000))]
    pub interval: Option<u64>,

    #[arg(short = 't', long)]
    pub theme: Option<String>,

    /// Sound played when the countdown ends
    #[arg(long)]
    pub sound_file: Option<PathBuf>,

    #[arg(long)]
    pub no_sound: bool,

    #[arg(long)]
    pub no_popup: bool,

    #[arg(long)]
    pub no_tray: bool,

    /// Directory holding config.json and the log file
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Command-line values win over the saved configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ms) = self.interval {
            config.refresh_interval_ms = ms;
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        let prefs = &mut config.notifications;
        if let Some(file) = &self.sound_file {
            prefs.sound_file = file.clone();
        }
        if self.no_sound {
            prefs.sound = false;
        }
        if self.no_popup {
            prefs.popup = false;
        }
        if self.no_tray {
            prefs.tray = false;
        }
        prefs.normalize();
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// `1h30m`, `45s`, `2m5s`; a trailing bare number counts as seconds.
pub fn parse_duration(s: &str) -> Result<u32, String> {
    let s = s.trim().to_lowercase();
    let mut total: u64 = 0;
    let mut num = String::new();

    let mut take = |num: &mut String, unit: u64, what: &str| -> Result<(), String> {
        let value: u64 = num.parse().map_err(|_| format!("Invalid {what}"))?;
        total = total.saturating_add(value.saturating_mul(unit));
        num.clear();
        Ok(())
    };

    for c in s.chars() {
        match c {
            '0'..='9' => num.push(c),
            'h' => take(&mut num, 3600, "hours")?,
            'm' => take(&mut num, 60, "minutes")?,
            's' => take(&mut num, 1, "seconds")?,
            _ => return Err("Invalid format".into()),
        }
    }
    if !num.is_empty() {
        take(&mut num, 1, "seconds")?;
    }

    match u32::try_from(total) {
        Ok(0) => Err("Duration must be > 0".into()),
        Ok(secs) => Ok(secs),
        Err(_) => Err("Duration too long".into()),
    }
}

pub fn parse_clock_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| format!("Invalid clock time '{s}', expected HH:MM or HH:MM:SS"))
}
