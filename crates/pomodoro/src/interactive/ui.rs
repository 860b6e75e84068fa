//! UI rendering

use pomodoro::session::Accent;
use pomodoro::TimerState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use tomato_core::format;

use super::app::{App, MessageKind};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    // Timer, messages, input, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_timer(f, app, chunks[0]);
    draw_messages(f, app, chunks[1]);
    draw_input(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Red => Color::Red,
        Accent::Green => Color::Green,
        Accent::Blue => Color::Blue,
    }
}

fn draw_timer(f: &mut Frame, app: &App, area: Rect) {
    let timer = &app.timer;
    let session_type = timer.session_type();
    let color = accent_color(session_type.accent());

    let block = Block::default()
        .title(" 🍅 Tomato Pomodoro ")
        .title_style(Style::default().fg(color).bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Session name
            Constraint::Length(1),
            Constraint::Length(1), // Clock
            Constraint::Length(1),
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Cycles
            Constraint::Min(0),
        ])
        .split(inner);

    let title = Line::from(vec![
        Span::raw(format!("{} ", session_type.emoji())),
        Span::styled(session_type.name(), Style::default().fg(color).bold()),
    ]);
    f.render_widget(Paragraph::new(title).alignment(Alignment::Center), rows[0]);

    let clock = match timer.state() {
        TimerState::Idle | TimerState::AwaitingStart => Line::from(Span::styled(
            "Type /start to begin",
            Style::default().fg(Color::DarkGray),
        )),
        TimerState::Paused => Line::from(vec![
            Span::styled(
                format::clock(timer.remaining_seconds()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  PAUSED", Style::default().fg(Color::Yellow).bold()),
        ]),
        TimerState::AwaitingConfirmation => Line::from(Span::styled(
            format!("Ready for {}? (y/n)", session_type.name()),
            Style::default().fg(Color::Yellow),
        )),
        TimerState::Running => Line::from(Span::styled(
            format::clock(timer.remaining_seconds()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    };
    f.render_widget(Paragraph::new(clock).alignment(Alignment::Center), rows[2]);

    let percent = timer.progress_percent().min(100) as u16;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(percent)
        .label(format!("{}%", percent));
    f.render_widget(gauge, pad(rows[4], 2));

    let cycles = Line::from(Span::styled(
        format!(
            "Cycle {}/{}",
            timer.completed_cycles(),
            timer.settings().cycles_before_long_break
        ),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(cycles).alignment(Alignment::Center), rows[5]);
}

fn draw_messages(f: &mut Frame, app: &App, area: Rect) {
    // Only the tail fits; borders take two rows
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.messages.len().saturating_sub(visible);

    let items: Vec<Line> = app
        .messages
        .iter()
        .skip(skip)
        .map(|m| {
            let color = match m.kind {
                MessageKind::Info => Color::Cyan,
                MessageKind::Success => Color::Green,
                MessageKind::Warning => Color::Yellow,
                MessageKind::Error => Color::Red,
            };

            Line::from(vec![
                Span::styled(
                    format!("{} ", format::time(m.timestamp)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(m.text.clone(), Style::default().fg(color)),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Messages ")
        .title_style(Style::default().fg(Color::Cyan).bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(items).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, border) = if app.confirming() {
        (" y/n ", Color::Yellow)
    } else {
        (" Command ", Color::Cyan)
    };

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(border)),
        Span::raw(app.input.as_str()),
    ]))
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, area);

    // Cursor after the prompt and the typed text
    let typed = u16::try_from(app.input.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(3).saturating_add(typed);
    f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
}

fn draw_footer(f: &mut Frame, _app: &App, area: Rect) {
    let help = Line::from(vec![
        Span::styled(" /help", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" commands  "),
        Span::styled("/exit", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" save & quit  "),
        Span::styled("Esc", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" save & quit"),
    ]);

    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn pad(area: Rect, horizontal: u16) -> Rect {
    Rect {
        x: area.x + horizontal,
        width: area.width.saturating_sub(horizontal * 2),
        ..area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pomodoro::{ManualClock, MemorySessionStore, Timer};
    use ratatui::{backend::TestBackend, Terminal};
    use tomato_core::Settings;
    use tomato_notify::NullNotifier;

    fn app() -> App {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap());
        let (timer, completion) = Timer::restore(
            Settings::default(),
            None,
            Box::new(clock.clone()),
            Box::new(NullNotifier),
        );
        let store = MemorySessionStore::with_clock(Box::new(clock));
        App::new(timer, Box::new(store), completion).unwrap()
    }

    #[test]
    fn test_cursor_follows_input() {
        let mut app = app();
        for c in "/start".chars() {
            app.push_char(c);
        }

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor.x, 3 + 6);
    }

    #[test]
    fn test_cursor_stays_inside_box_for_huge_input() {
        let mut app = app();
        app.input = "x".repeat(usize::from(u16::MAX) - 1);

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor.x, 78);
    }
}
