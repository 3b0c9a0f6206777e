//! End-of-countdown notifications
//!
//! Three independent channels (desktop balloon, sound, popup) sit behind the
//! [`Notifier`] trait. The [`Dispatcher`] runs them in order, gated by the
//! user's [`NotificationPreferences`], and records each channel's outcome so
//! one broken channel never stops the others.

use notify_rust::{Notification, Urgency};
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    fmt,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    rc::Rc,
};
use tracing::{debug, info, warn};

use crate::error::{CountdownError, Result};

pub const DEFAULT_SOUND_FILE: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";

// ============================================================================
// Preferences
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Tray,
    Sound,
    Popup,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tray => "tray",
            Self::Sound => "sound",
            Self::Popup => "popup",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub enabled: bool,
    pub popup: bool,
    pub tray: bool,
    pub sound: bool,
    pub sound_file: PathBuf,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            popup: true,
            tray: true,
            sound: true,
            sound_file: PathBuf::from(DEFAULT_SOUND_FILE),
        }
    }
}

impl NotificationPreferences {
    /// With every channel off, the master switch is forced off too.
    pub fn normalize(&mut self) {
        if !(self.popup || self.tray || self.sound) {
            self.enabled = false;
        }
    }

    pub fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Tray => self.tray,
            Channel::Sound => self.sound,
            Channel::Popup => self.popup,
        }
    }

    pub fn set_channel(&mut self, channel: Channel, on: bool) {
        match channel {
            Channel::Tray => self.tray = on,
            Channel::Sound => self.sound = on,
            Channel::Popup => self.popup = on,
        }
    }
}

/// What the channels announce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub title: String,
    pub body: String,
}

impl Completion {
    pub fn finished() -> Self {
        Self {
            title: "Finished".into(),
            body: "The countdown is over".into(),
        }
    }
}

// ============================================================================
// Channels
// ============================================================================

pub trait Notifier {
    fn channel(&self) -> Channel;

    fn notify(&mut self, completion: &Completion, prefs: &NotificationPreferences) -> Result<()>;
}

/// Desktop notification, the terminal's stand-in for a tray balloon
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn channel(&self) -> Channel {
        Channel::Tray
    }

    fn notify(&mut self, completion: &Completion, _prefs: &NotificationPreferences) -> Result<()> {
        Notification::new()
            .summary(&completion.title)
            .body(&completion.body)
            .appname("countdown")
            .icon("alarm-clock")
            .urgency(Urgency::Critical)
            .show()
            .map_err(|e| CountdownError::Notification(e.to_string().into()))?;
        Ok(())
    }
}

/// External audio player invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub program: String,
    pub args: Vec<String>,
}

impl Player {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Plays the configured sound file once, without waiting for it to finish.
///
/// Finished players are reaped with `try_wait` on the next call.
#[derive(Debug)]
pub struct SoundNotifier {
    players: Vec<Player>,
    children: Vec<Child>,
}

impl Default for SoundNotifier {
    fn default() -> Self {
        Self::with_players(vec![
            Player::new("paplay", &[]),
            Player::new("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
            Player::new("aplay", &["-q"]),
            Player::new("afplay", &[]),
        ])
    }
}

impl SoundNotifier {
    /// Players are tried in order until one can be spawned.
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players,
            children: Vec::new(),
        }
    }

    /// Players spawned earlier that have not been seen to exit yet
    pub fn pending(&mut self) -> usize {
        self.reap();
        self.children.len()
    }

    fn reap(&mut self) {
        self.children.retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }

    pub fn play(&mut self, file: &Path) -> Result<()> {
        self.reap();
        if !file.is_file() {
            return Err(CountdownError::SoundFileMissing(file.to_path_buf()));
        }

        let mut last_err =
            std::io::Error::new(std::io::ErrorKind::NotFound, "no audio player configured");
        for player in &self.players {
            match Command::new(&player.program)
                .args(&player.args)
                .arg(file)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => {
                    debug!(player = %player.program, file = %file.display(), "sound started");
                    self.children.push(child);
                    return Ok(());
                }
                Err(e) => {
                    debug!(player = %player.program, error = %e, "audio player unavailable");
                    last_err = e;
                }
            }
        }
        Err(CountdownError::Player(last_err))
    }
}

impl Notifier for SoundNotifier {
    fn channel(&self) -> Channel {
        Channel::Sound
    }

    fn notify(&mut self, _completion: &Completion, prefs: &NotificationPreferences) -> Result<()> {
        self.play(&prefs.sound_file)
    }
}

/// Shared mailbox between the popup channel and the UI that renders it
#[derive(Debug, Clone, Default)]
pub struct PopupSlot(Rc<RefCell<Option<Completion>>>);

impl PopupSlot {
    pub fn post(&self, completion: Completion) {
        *self.0.borrow_mut() = Some(completion);
    }

    pub fn current(&self) -> Option<Completion> {
        self.0.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn dismiss(&self) {
        self.0.borrow_mut().take();
    }
}

/// Modal "Finished" box drawn over the timer view
#[derive(Debug, Default)]
pub struct PopupNotifier {
    slot: PopupSlot,
}

impl PopupNotifier {
    pub fn new(slot: PopupSlot) -> Self {
        Self { slot }
    }
}

impl Notifier for PopupNotifier {
    fn channel(&self) -> Channel {
        Channel::Popup
    }

    fn notify(&mut self, completion: &Completion, _prefs: &NotificationPreferences) -> Result<()> {
        self.slot.post(completion.clone());
        Ok(())
    }
}

// ============================================================================
// Dispatch
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Delivered,
    /// Channel switched off in the preferences
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Master switch was off; no channel ran
    pub suppressed: bool,
    pub outcomes: Vec<(Channel, ChannelOutcome)>,
}

impl DispatchReport {
    pub fn outcome(&self, channel: Channel) -> Option<&ChannelOutcome> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, o)| o)
    }

    pub fn delivered(&self, channel: Channel) -> bool {
        self.outcome(channel) == Some(&ChannelOutcome::Delivered)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Channel, &str)> {
        self.outcomes.iter().filter_map(|(c, o)| match o {
            ChannelOutcome::Failed(reason) => Some((*c, reason.as_str())),
            _ => None,
        })
    }
}

/// Ordered list of notification channels
#[derive(Default)]
pub struct Dispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balloon, then sound, then popup.
    pub fn standard(popup: PopupSlot) -> Self {
        Self::new()
            .with(DesktopNotifier)
            .with(SoundNotifier::default())
            .with(PopupNotifier::new(popup))
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn dispatch(
        &mut self,
        prefs: &NotificationPreferences,
        completion: &Completion,
    ) -> DispatchReport {
        if !prefs.enabled {
            debug!("notifications disabled");
            return DispatchReport {
                suppressed: true,
                outcomes: Vec::new(),
            };
        }

        let outcomes = self
            .notifiers
            .iter_mut()
            .map(|notifier| {
                let channel = notifier.channel();
                if !prefs.channel_enabled(channel) {
                    return (channel, ChannelOutcome::Skipped);
                }
                match notifier.notify(completion, prefs) {
                    Ok(()) => {
                        info!(%channel, "notification delivered");
                        (channel, ChannelOutcome::Delivered)
                    }
                    Err(e) => {
                        warn!(%channel, error = %e, "notification channel failed");
                        (channel, ChannelOutcome::Failed(e.to_string()))
                    }
                }
            })
            .collect();

        DispatchReport {
            suppressed: false,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Recording {
        channel: Channel,
        calls: Rc<Cell<u32>>,
        fail: bool,
    }

    impl Notifier for Recording {
        fn channel(&self) -> Channel {
            self.channel
        }

        fn notify(&mut self, _: &Completion, _: &NotificationPreferences) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(CountdownError::SoundFileMissing(PathBuf::from("/nope.ogg")))
            } else {
                Ok(())
            }
        }
    }

    fn recording(channel: Channel, fail: bool) -> (Recording, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let n = Recording {
            channel,
            calls: Rc::clone(&calls),
            fail,
        };
        (n, calls)
    }

    #[test]
    fn all_channels_off_forces_master_off() {
        let mut prefs = NotificationPreferences {
            popup: false,
            tray: false,
            sound: false,
            ..Default::default()
        };
        prefs.normalize();
        assert!(!prefs.enabled);

        let mut prefs = NotificationPreferences {
            popup: false,
            ..Default::default()
        };
        prefs.normalize();
        assert!(prefs.enabled);
    }

    #[test]
    fn master_switch_suppresses_everything() {
        let (tray, calls) = recording(Channel::Tray, false);
        let mut dispatcher = Dispatcher::new().with(tray);
        let prefs = NotificationPreferences {
            enabled: false,
            ..Default::default()
        };

        let report = dispatcher.dispatch(&prefs, &Completion::finished());
        assert!(report.suppressed);
        assert!(report.outcomes.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn failing_channel_does_not_block_others() {
        let (tray, tray_calls) = recording(Channel::Tray, false);
        let (sound, sound_calls) = recording(Channel::Sound, true);
        let slot = PopupSlot::default();
        let mut dispatcher = Dispatcher::new()
            .with(tray)
            .with(sound)
            .with(PopupNotifier::new(slot.clone()));

        let report = dispatcher.dispatch(&NotificationPreferences::default(), &Completion::finished());

        assert_eq!(tray_calls.get(), 1);
        assert_eq!(sound_calls.get(), 1);
        assert!(report.delivered(Channel::Tray));
        assert!(report.delivered(Channel::Popup));
        assert!(matches!(report.outcome(Channel::Sound), Some(ChannelOutcome::Failed(_))));
        assert_eq!(report.failures().count(), 1);
        assert_eq!(slot.current(), Some(Completion::finished()));
    }

    #[test]
    fn disabled_channel_is_skipped() {
        let (tray, calls) = recording(Channel::Tray, false);
        let mut dispatcher = Dispatcher::new().with(tray);
        let prefs = NotificationPreferences {
            tray: false,
            ..Default::default()
        };

        let report = dispatcher.dispatch(&prefs, &Completion::finished());
        assert_eq!(report.outcome(Channel::Tray), Some(&ChannelOutcome::Skipped));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn standard_dispatcher_order() {
        let dispatcher = Dispatcher::standard(PopupSlot::default());
        let order: Vec<Channel> = dispatcher.notifiers.iter().map(|n| n.channel()).collect();
        assert_eq!(order, vec![Channel::Tray, Channel::Sound, Channel::Popup]);
    }

    #[test]
    fn missing_sound_file_is_reported() {
        let mut notifier = SoundNotifier::default();
        let err = notifier
            .play(Path::new("/definitely/not/here.oga"))
            .unwrap_err();
        assert!(matches!(err, CountdownError::SoundFileMissing(_)));
    }

    #[test]
    fn unavailable_player_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut notifier =
            SoundNotifier::with_players(vec![Player::new("countdown-no-such-player", &[])]);
        let err = notifier.play(file.path()).unwrap_err();
        assert!(matches!(err, CountdownError::Player(_)));
    }

    #[cfg(unix)]
    #[test]
    fn finished_player_is_reaped_without_blocking() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut notifier = SoundNotifier::with_players(vec![Player::new("true", &[])]);
        notifier.play(file.path()).unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while notifier.pending() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(notifier.pending(), 0);
    }

    #[test]
    fn popup_slot_dismiss() {
        let slot = PopupSlot::default();
        slot.post(Completion::finished());
        assert!(slot.is_open());
        slot.dismiss();
        assert!(!slot.is_open());
    }
}
