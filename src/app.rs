//! Application controller
//!
//! Owns the countdown timer, the configuration and the notification
//! dispatcher, and translates key presses and scheduler ticks into calls on
//! them. Rendering lives in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::{
    cli::Args,
    clock::{Clock, SystemClock, Ticker},
    config::{AppConfig, ConfigStore},
    countdown::{CountdownTimer, Frame, Status, Tick, TimeParts},
    dialog::{EventsForm, TimeForm, TimeFormKind},
    notify::{Completion, DispatchReport, Dispatcher, NotificationPreferences, PopupSlot},
    ui::{Theme, get_theme},
};

pub const TITLE: &str = "Countdown";
/// Redraw cadence for animations while no tick is due
pub const UI_REFRESH: Duration = Duration::from_millis(100);

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum View {
    Timer,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Time(TimeForm),
    Events(EventsForm),
}

pub struct App<C: Clock = SystemClock> {
    pub timer: CountdownTimer<C, Ticker>,
    /// Effective settings, command-line overrides included
    pub config: AppConfig,
    /// What goes back to disk; overrides never reach it
    saved: AppConfig,
    store: Option<ConfigStore>,
    dispatcher: Dispatcher,
    pub popup: PopupSlot,
    pub view: View,
    pub dialog: Option<Dialog>,
    pub minimized: bool,
    pub theme: Theme,
    /// Last values shown by the time label and progress bar
    pub frame: Option<Frame>,
    pub status_message: Option<String>,
    pub animation_frame: u8,
    pub last_report: Option<DispatchReport>,
    bell: bool,
}

impl<C: Clock> App<C> {
    pub fn new(
        clock: C,
        config: AppConfig,
        store: Option<ConfigStore>,
        dispatcher: Dispatcher,
        popup: PopupSlot,
    ) -> Self {
        let timer = CountdownTimer::new(clock, Ticker::new(), config.refresh_interval());
        let theme = get_theme(&config.theme);
        Self {
            timer,
            saved: config.clone(),
            config,
            store,
            dispatcher,
            popup,
            view: View::Timer,
            dialog: None,
            minimized: false,
            theme,
            frame: None,
            status_message: None,
            animation_frame: 0,
            last_report: None,
            bell: false,
        }
    }

    /// Layer command-line flags over the loaded settings for this run only.
    pub fn apply_args(&mut self, args: &Args) {
        args.apply(&mut self.config);
        self.theme = get_theme(&self.config.theme);
        self.timer.set_interval(self.config.refresh_interval());
    }

    // ------------------------------------------------------------------------
    // Countdown actions
    // ------------------------------------------------------------------------

    pub fn start_duration(&mut self, hours: u32, minutes: u32, seconds: u32) {
        let res = self.timer.start_duration(hours, minutes, seconds);
        self.after_start(res);
    }

    /// Start from a total number of seconds, as given on the command line.
    pub fn start_duration_secs(&mut self, secs: u32) {
        let parts = TimeParts::from_secs(u64::from(secs));
        self.start_duration(parts.hours as u32, parts.minutes as u32, parts.seconds as u32);
    }

    pub fn start_at(&mut self, hours: u32, minutes: u32, seconds: u32) {
        let res = self.timer.start_at(hours, minutes, seconds);
        self.after_start(res);
    }

    fn after_start(&mut self, res: crate::error::Result<()>) {
        match res {
            Ok(()) => {
                self.popup.dismiss();
                self.status_message = None;
                self.frame = self.timer.snapshot();
            }
            Err(e) => {
                warn!(error = %e, "countdown not started");
                self.status_message = Some(e.to_string());
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        if !self.timer.toggle_pause() {
            return;
        }
        self.status_message = match self.timer.status() {
            Status::Paused => Some("Pause".into()),
            _ => None,
        };
        self.frame = self.timer.snapshot();
    }

    pub fn is_paused(&self) -> bool {
        self.timer.status() == Status::Paused
    }

    /// Run the scheduler callback if its interval has elapsed.
    pub fn update(&mut self, now: Instant) {
        if self.timer.scheduler_mut().fire_if_due(now) {
            self.tick();
        }
        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;
    }

    pub fn tick(&mut self) {
        match self.timer.tick() {
            Tick::Idle => {}
            Tick::Update(frame) => self.frame = Some(frame),
            Tick::Completed(frame) => {
                self.frame = Some(frame);
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        // Bring the window forward before any channel fires.
        self.minimized = false;
        self.view = View::Timer;
        self.status_message = None;
        self.bell = true;

        let report = self
            .dispatcher
            .dispatch(&self.config.notifications, &Completion::finished());
        if let Some((channel, reason)) = report.failures().next() {
            self.status_message = Some(format!("{channel} notification failed: {reason}"));
        }
        self.last_report = Some(report);
    }

    /// How long the event loop may wait for input.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.timer
            .scheduler()
            .time_until_due(now)
            .map_or(UI_REFRESH, |d| d.min(UI_REFRESH))
    }

    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Terminal title; doubles as the tray tooltip.
    pub fn window_title(&self) -> String {
        match (self.timer.status(), self.frame) {
            (Status::Idle, _) | (_, None) => TITLE.to_string(),
            (Status::Paused, Some(frame)) => format!("{} - {TITLE} - Pause", frame.time),
            (_, Some(frame)) => format!("{} - {TITLE}", frame.time),
        }
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn apply_notifications(&mut self, prefs: NotificationPreferences) {
        debug!(?prefs, "notification preferences changed");
        self.saved.notifications = prefs.clone();
        self.config.notifications = prefs;
        self.save_config();
    }

    pub fn save_config(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.saved) {
                warn!(error = %e, "failed to save configuration");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Returns `true` when the application should quit.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return true;
        }

        if self.popup.is_open() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.popup.dismiss();
            }
            return false;
        }

        match self.dialog.take() {
            Some(Dialog::Time(form)) => self.handle_time_form(key, form),
            Some(Dialog::Events(form)) => self.handle_events_form(key, form),
            None => return self.handle_main_view(key),
        }
        false
    }

    fn handle_main_view(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc if self.view == View::Help => self.view = View::Timer,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.dialog = Some(Dialog::Time(TimeForm::duration()));
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                let now = self.timer.clock().time_of_day();
                self.dialog = Some(Dialog::Time(TimeForm::target(now)));
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                self.dialog = Some(Dialog::Events(EventsForm::new(&self.config.notifications)));
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Char('m') | KeyCode::Char('M') => self.minimized = !self.minimized,
            // Ctrl+H arrives as Backspace in most terminals
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::Backspace => {
                self.view = if self.view == View::Help {
                    View::Timer
                } else {
                    View::Help
                };
            }
            _ => {}
        }
        false
    }

    fn handle_time_form(&mut self, key: KeyEvent, mut form: TimeForm) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let (h, m, s) = form.values();
                match form.kind {
                    TimeFormKind::Duration => self.start_duration(h, m, s),
                    TimeFormKind::Target => self.start_at(h, m, s),
                }
                return;
            }
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('k') => form.focused_mut().increment(),
            KeyCode::Down | KeyCode::Char('-') | KeyCode::Char('j') => {
                form.focused_mut().decrement()
            }
            KeyCode::Tab | KeyCode::Right => form.next_field(),
            KeyCode::BackTab | KeyCode::Left => form.prev_field(),
            KeyCode::Backspace => form.focused_mut().clear(),
            KeyCode::Char(c) => {
                if let Some(d) = c.to_digit(10) {
                    form.focused_mut().push_digit(d);
                }
            }
            _ => {}
        }
        self.dialog = Some(Dialog::Time(form));
    }

    fn handle_events_form(&mut self, key: KeyEvent, mut form: EventsForm) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                self.apply_notifications(form.finish());
                return;
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => form.prev_row(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => form.next_row(),
            KeyCode::Char(' ') | KeyCode::Char('x') => form.toggle(),
            _ => {}
        }
        self.dialog = Some(Dialog::Events(form));
    }
}
