//! Input dialogs: spin-box forms and the notification options box

use chrono::{NaiveTime, Timelike};

use crate::notify::{Channel, NotificationPreferences};

/// Bounded integer field, the terminal version of a spin box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinField {
    pub label: &'static str,
    pub value: u32,
    pub max: u32,
    /// Past `max` goes back to 0 (clock fields) instead of sticking
    pub wrap: bool,
}

impl SpinField {
    pub fn new(label: &'static str, max: u32, wrap: bool) -> Self {
        Self {
            label,
            value: 0,
            max,
            wrap,
        }
    }

    pub fn increment(&mut self) {
        self.value = match (self.value >= self.max, self.wrap) {
            (true, true) => 0,
            (true, false) => self.max,
            (false, _) => self.value + 1,
        };
    }

    pub fn decrement(&mut self) {
        self.value = match (self.value == 0, self.wrap) {
            (true, true) => self.max,
            (true, false) => 0,
            (false, _) => self.value - 1,
        };
    }

    /// Typing a digit shifts it in from the right, like editing a spin box.
    pub fn push_digit(&mut self, digit: u32) {
        let shifted = self.value * 10 + digit;
        self.value = if shifted <= self.max { shifted } else { digit.min(self.max) };
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }

    pub fn set(&mut self, value: u32) {
        self.value = value.min(self.max);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormKind {
    /// How long to count down
    Duration,
    /// Which clock time to count down to
    Target,
}

/// Hours/minutes/seconds form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeForm {
    pub kind: TimeFormKind,
    pub fields: [SpinField; 3],
    pub focus: usize,
}

impl TimeForm {
    pub fn duration() -> Self {
        Self {
            kind: TimeFormKind::Duration,
            fields: [
                SpinField::new("Hours", 99, false),
                SpinField::new("Minutes", 99, false),
                SpinField::new("Seconds", 99, false),
            ],
            focus: 0,
        }
    }

    /// Pre-filled with `now`.
    pub fn target(now: NaiveTime) -> Self {
        let mut fields = [
            SpinField::new("Hour", 23, true),
            SpinField::new("Minute", 59, true),
            SpinField::new("Second", 59, true),
        ];
        fields[0].set(now.hour());
        fields[1].set(now.minute());
        fields[2].set(now.second());
        Self {
            kind: TimeFormKind::Target,
            fields,
            focus: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            TimeFormKind::Duration => " New duration ",
            TimeFormKind::Target => " New date ",
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn focused_mut(&mut self) -> &mut SpinField {
        &mut self.fields[self.focus]
    }

    pub fn values(&self) -> (u32, u32, u32) {
        (self.fields[0].value, self.fields[1].value, self.fields[2].value)
    }
}

/// Rows of the notification options box, top to bottom
pub const EVENT_ROWS: [EventRow; 4] = [
    EventRow::Master,
    EventRow::Channel(Channel::Popup),
    EventRow::Channel(Channel::Tray),
    EventRow::Channel(Channel::Sound),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRow {
    Master,
    Channel(Channel),
}

impl EventRow {
    pub fn label(self) -> &'static str {
        match self {
            Self::Master => "Enable notifications",
            Self::Channel(Channel::Popup) => "Show a popup",
            Self::Channel(Channel::Tray) => "Show a desktop notification",
            Self::Channel(Channel::Sound) => "Play a sound",
        }
    }
}

/// Editable copy of the notification preferences; applied on confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsForm {
    pub prefs: NotificationPreferences,
    pub focus: usize,
}

impl EventsForm {
    pub fn new(prefs: &NotificationPreferences) -> Self {
        Self {
            prefs: prefs.clone(),
            focus: 0,
        }
    }

    pub fn next_row(&mut self) {
        self.focus = (self.focus + 1) % EVENT_ROWS.len();
    }

    pub fn prev_row(&mut self) {
        self.focus = (self.focus + EVENT_ROWS.len() - 1) % EVENT_ROWS.len();
    }

    pub fn is_checked(&self, row: EventRow) -> bool {
        match row {
            EventRow::Master => self.prefs.enabled,
            EventRow::Channel(c) => self.prefs.channel_enabled(c),
        }
    }

    /// Channel rows can only be changed while the group is enabled.
    pub fn is_editable(&self, row: EventRow) -> bool {
        matches!(row, EventRow::Master) || self.prefs.enabled
    }

    pub fn toggle(&mut self) {
        let row = EVENT_ROWS[self.focus];
        if !self.is_editable(row) {
            return;
        }
        match row {
            EventRow::Master => self.prefs.enabled = !self.prefs.enabled,
            EventRow::Channel(c) => {
                let on = self.prefs.channel_enabled(c);
                self.prefs.set_channel(c, !on);
            }
        }
    }

    pub fn finish(mut self) -> NotificationPreferences {
        self.prefs.normalize();
        self.prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_fields_clamp() {
        let mut f = SpinField::new("Hours", 99, false);
        f.decrement();
        assert_eq!(f.value, 0);
        f.set(99);
        f.increment();
        assert_eq!(f.value, 99);
    }

    #[test]
    fn clock_fields_wrap() {
        let mut f = SpinField::new("Minute", 59, true);
        f.decrement();
        assert_eq!(f.value, 59);
        f.increment();
        assert_eq!(f.value, 0);
    }

    #[test]
    fn typed_digits_shift_in() {
        let mut f = SpinField::new("Hour", 23, true);
        f.push_digit(1);
        f.push_digit(7);
        assert_eq!(f.value, 17);
        // 175 is out of range, start over with the new digit
        f.push_digit(5);
        assert_eq!(f.value, 5);
        f.clear();
        f.push_digit(9);
        assert_eq!(f.value, 9);
    }

    #[test]
    fn target_form_starts_at_now() {
        let form = TimeForm::target(NaiveTime::from_hms_opt(8, 15, 42).unwrap());
        assert_eq!(form.values(), (8, 15, 42));
        assert_eq!(form.kind, TimeFormKind::Target);
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut form = TimeForm::duration();
        form.prev_field();
        assert_eq!(form.focus, 2);
        form.next_field();
        assert_eq!(form.focus, 0);
        form.focused_mut().increment();
        assert_eq!(form.values(), (1, 0, 0));
    }

    #[test]
    fn unchecking_every_channel_disables_master() {
        let mut form = EventsForm::new(&NotificationPreferences::default());
        for _ in 0..3 {
            form.next_row();
            form.toggle();
        }
        let prefs = form.finish();
        assert!(!prefs.popup && !prefs.tray && !prefs.sound);
        assert!(!prefs.enabled);
    }

    #[test]
    fn channels_locked_while_master_off() {
        let mut form = EventsForm::new(&NotificationPreferences::default());
        form.toggle();
        assert!(!form.prefs.enabled);

        form.next_row();
        form.toggle();
        assert!(form.prefs.popup);
    }
}
