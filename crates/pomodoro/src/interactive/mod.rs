//! Full-screen timer
//!
//! A 1-second tick redraws from the recomputed remaining time and completes
//! the session when it runs out. Slash commands come in on a single input
//! line; Esc, Ctrl-C, `/exit` and termination signals all save and leave.

mod app;
mod signals;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use pomodoro::{SessionStore, SystemClock, Timer};
use tomato_notify::DesktopNotifier;

use crate::cli::Stores;
use app::App;

const TICK_RATE: Duration = Duration::from_secs(1);

/// Run the interactive timer until the user leaves
pub fn run(stores: Stores) -> Result<()> {
    let shutdown = signals::watch()?;

    let (timer, completion) = Timer::restore(
        stores.settings.get(),
        stores.sessions.load(),
        Box::new(SystemClock),
        Box::new(DesktopNotifier::quiet()),
    );
    let mut app = App::new(timer, Box::new(stores.sessions), completion)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &shutdown);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("interactive timer failed: {:#}", err);
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }

    if app.saved_on_exit {
        println!("Session saved! Will resume next time.");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, shutdown: &AtomicBool) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if shutdown.load(Ordering::SeqCst) {
            app.save_and_exit()?;
        }
        if app.should_quit {
            return Ok(());
        }

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => app.save_and_exit()?,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.save_and_exit()?
                        }
                        KeyCode::Enter => app.submit()?,
                        KeyCode::Backspace => app.backspace(),
                        KeyCode::Char(c) => app.push_char(c),
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick()?;
            last_tick = Instant::now();
        }
    }
}
