//! End-to-end countdown flows driven by a hand-set clock

use std::{cell::Cell, rc::Rc, time::Duration};

use countdown::{
    clock::{Clock, ManualClock, Scheduler, Ticker},
    countdown::{CountdownTimer, Progress, Status, Tick},
    error::Result,
    notify::{
        Channel, Completion, Dispatcher, NotificationPreferences, Notifier, PopupNotifier,
        PopupSlot, SoundNotifier,
    },
};

struct CountingNotifier {
    channel: Channel,
    fired: Rc<Cell<u32>>,
}

impl Notifier for CountingNotifier {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn notify(&mut self, _: &Completion, _: &NotificationPreferences) -> Result<()> {
        self.fired.set(self.fired.get() + 1);
        Ok(())
    }
}

fn timer(clock: &ManualClock) -> CountdownTimer<ManualClock, Ticker> {
    CountdownTimer::new(clock.clone(), Ticker::new(), Duration::from_millis(100))
}

/// Ticks `steps` times at 100ms spacing, dispatching on completion.
fn run_ticks(
    timer: &mut CountdownTimer<ManualClock, Ticker>,
    clock: &ManualClock,
    dispatcher: &mut Dispatcher,
    prefs: &NotificationPreferences,
    steps: u32,
) -> u32 {
    let mut completions = 0;
    for _ in 0..steps {
        clock.advance(0.1);
        if let Tick::Completed(_) = timer.tick() {
            completions += 1;
            dispatcher.dispatch(prefs, &Completion::finished());
        }
    }
    completions
}

#[test]
fn pause_gap_does_not_count_against_the_countdown() {
    let clock = ManualClock::new(100.0);
    let mut timer = timer(&clock);
    timer.start_duration(0, 0, 5).unwrap();

    clock.set(102.0);
    timer.pause();
    clock.set(110.0);
    timer.resume();

    assert_eq!(timer.session().unwrap().end(), 113.0);
    clock.set(112.9);
    assert!(matches!(timer.tick(), Tick::Update(_)));
    clock.set(113.0);
    assert!(matches!(timer.tick(), Tick::Completed(_)));
}

#[test]
fn completion_dispatches_every_channel_once() {
    let clock = ManualClock::new(0.0);
    let mut timer = timer(&clock);
    let fired = Rc::new(Cell::new(0));
    let popup = PopupSlot::default();
    let mut dispatcher = Dispatcher::new()
        .with(CountingNotifier {
            channel: Channel::Tray,
            fired: Rc::clone(&fired),
        })
        .with(SoundNotifier::default())
        .with(PopupNotifier::new(popup.clone()));
    let prefs = NotificationPreferences {
        sound_file: "/no/such/sound.oga".into(),
        ..Default::default()
    };

    timer.start_duration(0, 0, 2).unwrap();
    let completions = run_ticks(&mut timer, &clock, &mut dispatcher, &prefs, 40);

    assert_eq!(completions, 1);
    assert_eq!(fired.get(), 1);
    assert!(popup.is_open());
    assert_eq!(timer.status(), Status::Completed);
    assert!(!timer.scheduler().is_scheduled());
}

#[test]
fn restart_after_completion_runs_again() {
    let clock = ManualClock::new(0.0);
    let mut timer = timer(&clock);

    timer.start_duration(0, 0, 1).unwrap();
    clock.set(1.0);
    assert!(matches!(timer.tick(), Tick::Completed(_)));

    timer.start_duration(0, 0, 3).unwrap();
    assert_eq!(timer.status(), Status::Running);
    let frame = timer.snapshot().unwrap();
    assert_eq!(frame.time.to_string(), "00:00:03");
    assert_eq!(frame.progress, Progress::Percent(0.0));
}

#[test]
fn clock_target_counts_to_next_occurrence() {
    // 23:00:00
    let clock = ManualClock::new(82_800.0);
    let mut timer = timer(&clock);
    timer.start_at(1, 0, 0).unwrap();

    assert_eq!(timer.session().unwrap().total(), 7_200.0);
    assert_eq!(clock.now(), 82_800.0);
}
