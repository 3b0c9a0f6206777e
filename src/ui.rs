//! Terminal rendering

use ratatui::{prelude::*, widgets::*};

use crate::{
    app::{App, Dialog, TITLE, View},
    clock::Clock,
    countdown::{Progress, Status},
    dialog::{EVENT_ROWS, EventsForm, TimeForm},
};

// ============================================================================
// Themes
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub running_color: Color,
    pub paused_color: Color,
    pub finished_color: Color,
    pub border_color: Color,
    pub accent_color: Color,
}

pub fn get_theme(name: &str) -> Theme {
    match name {
        "nord" => Theme {
            running_color: Color::Rgb(136, 192, 208),
            paused_color: Color::Rgb(235, 203, 139),
            finished_color: Color::Rgb(163, 190, 140),
            border_color: Color::Rgb(94, 129, 172),
            accent_color: Color::Rgb(180, 142, 173),
        },
        "dracula" => Theme {
            running_color: Color::Rgb(189, 147, 249),
            paused_color: Color::Rgb(241, 250, 140),
            finished_color: Color::Rgb(80, 250, 123),
            border_color: Color::Rgb(98, 114, 164),
            accent_color: Color::Rgb(255, 121, 198),
        },
        "gruvbox" => Theme {
            running_color: Color::Rgb(254, 128, 25),
            paused_color: Color::Rgb(250, 189, 47),
            finished_color: Color::Rgb(184, 187, 38),
            border_color: Color::Rgb(213, 196, 161),
            accent_color: Color::Rgb(211, 134, 155),
        },
        _ => Theme {
            running_color: Color::Rgb(100, 181, 246),
            paused_color: Color::Yellow,
            finished_color: Color::Rgb(0, 255, 150),
            border_color: Color::Rgb(0, 200, 255),
            accent_color: Color::Rgb(255, 100, 0),
        },
    }
}

// ============================================================================
// Views
// ============================================================================

pub fn render_ui<C: Clock>(f: &mut Frame, app: &App<C>) {
    if app.minimized {
        render_minimized(f, app);
    } else {
        match app.view {
            View::Timer => render_timer(f, app),
            View::Help => render_help(f, app),
        }
    }

    match &app.dialog {
        Some(Dialog::Time(form)) => render_time_form(f, app, form),
        Some(Dialog::Events(form)) => render_events_form(f, app, form),
        None => {}
    }

    if let Some(completion) = app.popup.current() {
        let area = centered_rect(50, 30, f.size());
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                completion.body,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Enter to close", Style::default().fg(Color::DarkGray))),
        ];
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                dialog_block(app, &completion.title).border_style(
                    Style::default().fg(app.theme.finished_color),
                ),
            ),
            area,
        );
    }
}

fn state_color<C: Clock>(app: &App<C>) -> Color {
    match app.frame.map(|fr| fr.progress) {
        Some(Progress::Indeterminate) => app.theme.finished_color,
        _ if app.is_paused() => app.theme.paused_color,
        _ => app.theme.running_color,
    }
}

fn time_text<C: Clock>(app: &App<C>) -> String {
    app.frame
        .map_or_else(|| "--:--:--".to_string(), |fr| fr.time.to_string())
}

fn render_minimized<C: Clock>(f: &mut Frame, app: &App<C>) {
    let area = centered_rect(40, 30, f.size());
    let color = state_color(app);
    let status = match app.timer.status() {
        Status::Idle => "IDLE",
        Status::Running => "▶ RUNNING",
        Status::Paused => "⏸ PAUSED",
        Status::Completed => "✔ FINISHED",
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            time_text(app),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(status, Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled(
            "Press M to restore",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .title(format!(" ⏳ {TITLE} "))
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.theme.border_color)),
        ),
        area,
    );
}

fn render_timer<C: Clock>(f: &mut Frame, app: &App<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(app.theme.border_color))
            .title(Span::styled(
                format!(" ⏳ {} ", TITLE.to_uppercase()),
                Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD),
            )),
        chunks[0],
    );

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Percentage(20),
        ])
        .split(chunks[1]);
    let color = state_color(app);

    f.render_widget(
        Paragraph::new(time_text(app))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[1],
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
        .gauge_style(Style::default().fg(color).bg(Color::Black));
    let gauge = match app.frame.map(|fr| fr.progress) {
        Some(Progress::Percent(p)) => gauge.percent(p.clamp(0.0, 100.0) as u16),
        // Busy bar: sweep back and forth
        Some(Progress::Indeterminate) => {
            let step = u16::from(app.animation_frame % 20);
            let pos = if step < 10 { step } else { 20 - step };
            gauge.percent(pos * 10).label("Finished")
        }
        None => gauge.percent(0),
    };
    f.render_widget(gauge, horizontal_pad(sections[3], 10));

    let status = app.status_message.clone().unwrap_or_else(|| {
        match app.frame.map(|fr| fr.progress) {
            None => "Press N for a duration or D for a clock time".into(),
            Some(Progress::Indeterminate) => "Done".into(),
            Some(Progress::Percent(_)) => String::new(),
        }
    });
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(if app.is_paused() { app.theme.paused_color } else { Color::Gray }))
            .alignment(Alignment::Center),
        sections[5],
    );

    let controls = vec![
        Line::from(vec![
            span_key("N", app), Span::raw(" Duration  •  "),
            span_key("D", app), Span::raw(" Date  •  "),
            span_key("Space", app), Span::raw(" Pause/Resume  •  "),
            span_key("M", app), Span::raw(" Minimize"),
        ]),
        Line::from(vec![
            span_key("O", app), Span::raw(" Events  •  "),
            span_key("H", app), Span::raw(" Help  •  "),
            span_key("Q", app), Span::raw(" Quit"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn span_key<'a, C: Clock>(text: &'a str, app: &App<C>) -> Span<'a> {
    Span::styled(text, Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))
}

fn render_help<C: Clock>(f: &mut Frame, app: &App<C>) {
    let area = centered_rect(70, 85, f.size());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{TITLE} {}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  New countdown:"),
        help_line("N / Ctrl+N", "Count down a duration"),
        help_line("D / Ctrl+D", "Count down to a clock time"),
        Line::from(""),
        Line::from("  Running countdown:"),
        help_line("Space / P", "Pause or resume"),
        help_line("M", "Minimize to compact view"),
        Line::from(""),
        Line::from("  Options:"),
        help_line("O / Ctrl+O", "Notification events"),
        help_line("H / ? / Ctrl+H", "Toggle this help"),
        help_line("Q / Ctrl+Q", "Quit"),
        Line::from(""),
        Line::from("  In dialogs:"),
        help_line("↑ ↓ / digits", "Change the value"),
        help_line("Tab", "Next field"),
        help_line("Enter / Esc", "Confirm / cancel"),
    ];

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" About ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.theme.border_color)),
        ),
        area,
    );
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(format!("{key:<16}"), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(desc),
    ])
}

// ============================================================================
// Dialogs
// ============================================================================

fn dialog_block<'a, C: Clock>(app: &App<C>, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.accent_color))
}

fn render_time_form<C: Clock>(f: &mut Frame, app: &App<C>, form: &TimeForm) {
    let area = centered_rect(40, 40, f.size());

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate() {
        let style = if i == form.focus {
            Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{:>10}: ", field.label)),
            Span::styled(format!(" {:02} ", field.value), style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑↓ change  •  Tab next  •  Enter ok",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(dialog_block(app, form.title())),
        area,
    );
}

fn render_events_form<C: Clock>(f: &mut Frame, app: &App<C>, form: &EventsForm) {
    let area = centered_rect(50, 40, f.size());

    let mut lines = vec![Line::from("")];
    for (i, row) in EVENT_ROWS.iter().enumerate() {
        let mark = if form.is_checked(*row) { "[x]" } else { "[ ]" };
        let indent = if i == 0 { "" } else { "    " };
        let mut style = if form.is_editable(*row) {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if i == form.focus {
            style = style.fg(app.theme.accent_color).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(Span::styled(format!("{indent}{mark} {}", row.label()), style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Space toggle  •  Enter save  •  Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(dialog_block(app, " Events ")), area);
}

// ============================================================================
// Layout helpers
// ============================================================================

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}

fn horizontal_pad(r: Rect, percent: u16) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(percent),
            Constraint::Percentage(100 - 2 * percent),
            Constraint::Percentage(percent),
        ])
        .split(r)[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        config::AppConfig,
        notify::{Dispatcher, PopupNotifier, PopupSlot},
    };
    use ratatui::backend::TestBackend;

    fn app() -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let popup = PopupSlot::default();
        let dispatcher = Dispatcher::new().with(PopupNotifier::new(popup.clone()));
        (App::new(clock.clone(), AppConfig::default(), None, dispatcher, popup), clock)
    }

    fn screen<C: Clock>(app: &App<C>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn idle_screen_shows_placeholder() {
        let (app, _) = app();
        assert!(screen(&app).contains("--:--:--"));
    }

    #[test]
    fn running_screen_shows_remaining() {
        let (mut app, clock) = app();
        app.start_duration(0, 1, 5);
        clock.set(0.5);
        app.tick();
        assert!(screen(&app).contains("00:01:05"));
    }

    #[test]
    fn finished_screen_shows_popup() {
        let (mut app, clock) = app();
        app.start_duration(0, 0, 1);
        clock.set(1.0);
        app.tick();

        let text = screen(&app);
        assert!(text.contains("The countdown is over"));
        assert!(text.contains("Finished"));
    }

    #[test]
    fn help_screen_lists_ctrl_h() {
        let (mut app, _) = app();
        app.view = View::Help;
        assert!(screen(&app).contains("H / ? / Ctrl+H"));
    }

    #[test]
    fn unknown_theme_falls_back() {
        assert_eq!(get_theme("nope"), get_theme("default"));
        assert_ne!(get_theme("nord"), get_theme("default"));
    }
}
