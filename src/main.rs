use anyhow::Context;
use chrono::Timelike;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{io, path::PathBuf, time::Instant};
use tracing::info;

use countdown::{
    app::{App, TITLE},
    cli::Args,
    clock::SystemClock,
    config::{ConfigStore, DEFAULT_CONFIG_DIR},
    logging::init_logging_or_warn,
    notify::{Dispatcher, PopupSlot},
    ui::render_ui,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let store = ConfigStore::new(
        args.config_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".").join(DEFAULT_CONFIG_DIR)),
    );
    init_logging_or_warn(store.dir(), args.log_level());

    let popup = PopupSlot::default();
    let dispatcher = Dispatcher::standard(popup.clone());
    let mut app = App::new(SystemClock, store.load(), Some(store), dispatcher, popup);
    app.apply_args(&args);
    info!(
        interval_ms = app.config.refresh_interval_ms,
        notifications = app.config.notifications.enabled,
        "configuration ready"
    );

    if let Some(secs) = args.duration {
        app.start_duration_secs(secs);
    } else if let Some(at) = args.at {
        app.start_at(at.hour(), at.minute(), at.second());
    }

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        SetTitle(TITLE)
    )?;
    terminal.show_cursor()?;

    app.save_config();
    info!("countdown exited");
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> anyhow::Result<()> {
    let mut title = String::new();

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        let window_title = app.window_title();
        if window_title != title {
            execute!(terminal.backend_mut(), SetTitle(&window_title))?;
            title = window_title;
        }
        if app.take_bell() {
            execute!(terminal.backend_mut(), Print("\x07"))?;
        }

        if event::poll(app.poll_timeout(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_input(key) {
                    return Ok(());
                }
            }
        }

        app.update(Instant::now());
    }
}
