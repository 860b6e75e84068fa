//! CLI command definitions and one-shot handlers
//!
//! Every handler loads the saved session, applies at most one transition
//! (plus whatever completion expiry caused), saves, prints and returns.

use anyhow::Result;
use chrono::{Duration, Local};
use clap::{CommandFactory, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;
use tomato_core::{format, Paths, Settings, SettingsStore, SettingsUpdate};
use tomato_notify::{DesktopNotifier, Notifier, NullNotifier};

use pomodoro::session::Accent;
use pomodoro::{
    recover, Clock, Completion, FileSessionStore, Recovered, SessionStore, SessionType, SystemClock,
    Timer, TimerError, TimerState,
};

const BAR_WIDTH: usize = 25;

/// pomodoro - Work and break intervals that survive the terminal
#[derive(Parser)]
#[command(name = "pomodoro")]
#[command(about = "Pomodoro timer with persistent sessions and desktop notifications")]
#[command(version)]
#[command(after_help = r#"WHEN TO USE:
    Before a stretch of focused work. Each command is a separate process:
    the timer keeps counting between commands, and even across reboots.

CYCLE:
    work -> short break -> work -> ... -> long break (every 4th by default)

EXAMPLES:
    pomodoro start              # Start (or resume) the current session
    pomodoro status             # Time left in the current session
    pomodoro pause              # Freeze the countdown
    pomodoro skip               # Finish the current session now
    pomodoro config -w 50 -s 10 # 50 minute work, 10 minute short break
    pomodoro interactive        # Full-screen timer with /commands

ALIASES:
    pomodoro s     # start
    pomodoro st    # status
    pomodoro i     # interactive
"#)]
pub struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the current session, or resume a paused one
    #[command(alias = "s")]
    Start,

    /// Pause the running session
    Pause,

    /// Resume a paused session
    Resume,

    /// Stop and reset the timer
    #[command(alias = "end")]
    Stop,

    /// Show the current session
    #[command(alias = "st")]
    Status,

    /// Finish the current session now
    Skip,

    /// Show or change durations
    Config {
        /// Print the current settings
        #[arg(long)]
        show: bool,

        /// Restore the default settings
        #[arg(long)]
        reset: bool,

        /// Work session length in minutes
        #[arg(short, long, value_name = "MINS", allow_negative_numbers = true)]
        work: Option<i64>,

        /// Short break length in minutes
        #[arg(short, long, value_name = "MINS", allow_negative_numbers = true)]
        short: Option<i64>,

        /// Long break length in minutes
        #[arg(short, long, value_name = "MINS", allow_negative_numbers = true)]
        long: Option<i64>,

        /// Work sessions before a long break
        #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
        cycles: Option<i64>,
    },

    /// Full-screen timer with slash commands
    #[command(alias = "i")]
    Interactive,
}

/// Settings and session storage for one invocation
pub struct Stores {
    pub settings: SettingsStore,
    pub sessions: FileSessionStore,
}

impl Stores {
    pub fn open(paths: &Paths) -> Result<Self> {
        Self::with_clock(paths, Box::new(SystemClock))
    }

    /// Stores whose `savedAt` stamps come from `clock`
    pub fn with_clock(paths: &Paths, clock: Box<dyn Clock>) -> Result<Self> {
        Ok(Self {
            settings: SettingsStore::new(&paths.settings_file()),
            sessions: FileSessionStore::with_clock(&paths.session_file(), clock)?,
        })
    }
}

/// Answers "start the next session?"; `None` when nobody can answer
pub type Ask<'a> = Box<dyn FnMut(&str) -> Result<Option<bool>> + 'a>;

/// Run a command
pub fn run(command: Commands, paths: &Paths) -> Result<()> {
    let stores = Stores::open(paths)?;

    let (show, reset, update) = match command {
        Commands::Interactive => return crate::interactive::run(stores),
        Commands::Config {
            show,
            reset,
            work,
            short,
            long,
            cycles,
        } => (
            show,
            reset,
            SettingsUpdate {
                work_minutes: work,
                short_break_minutes: short,
                long_break_minutes: long,
                cycles_before_long_break: cycles,
            },
        ),
        _ => (false, false, SettingsUpdate::default()),
    };

    let notifier = DesktopNotifier::new();
    tracing::debug!("notifications via {}", notifier.backend().name());

    let mut stdout = io::stdout();
    let mut invocation = Invocation::new(
        &stores,
        Rc::new(SystemClock),
        Rc::new(notifier),
        Box::new(ask_on_terminal),
        &mut stdout,
    );

    match command {
        Commands::Start => invocation.start(),
        Commands::Pause => invocation.pause(),
        Commands::Resume => invocation.resume(),
        Commands::Stop => invocation.stop(),
        Commands::Status => invocation.status(),
        Commands::Skip => invocation.skip(),
        Commands::Config { .. } => invocation.config(show, reset, update),
        // Returned above
        Commands::Interactive => Ok(()),
    }
}

/// One one-shot command: where state, time, alerts, answers and output go
pub struct Invocation<'a> {
    stores: &'a Stores,
    clock: Rc<dyn Clock>,
    notifier: Rc<dyn Notifier>,
    ask: Ask<'a>,
    out: &'a mut dyn Write,
}

impl<'a> Invocation<'a> {
    pub fn new(
        stores: &'a Stores,
        clock: Rc<dyn Clock>,
        notifier: Rc<dyn Notifier>,
        ask: Ask<'a>,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            stores,
            clock,
            notifier,
            ask,
            out,
        }
    }

    fn restore(&self) -> (Timer, Option<Completion>) {
        Timer::restore(
            self.stores.settings.get(),
            self.stores.sessions.load(),
            Box::new(Rc::clone(&self.clock)),
            Box::new(Rc::clone(&self.notifier)),
        )
    }

    pub fn start(&mut self) -> Result<()> {
        let (mut timer, completion) = self.restore();

        if let Some(completion) = completion {
            writeln!(
                self.out,
                "{} {} ended while you were away",
                "[info]".cyan(),
                completion.finished.name()
            )?;
            timer.confirm(true)?;
            timer.persist(&self.stores.sessions)?;
            writeln!(self.out, "{} {} started", "▶".green(), timer.session_type().name())?;
            return self.print_timer(&timer);
        }

        let was_paused = timer.state() == TimerState::Paused;
        if let Err(e) = timer.start() {
            return self.print_refusal(&e);
        }
        timer.persist(&self.stores.sessions)?;

        let verb = if was_paused { "resumed" } else { "started" };
        writeln!(self.out, "{} {} {}", "▶".green(), timer.session_type().name(), verb)?;
        self.print_timer(&timer)
    }

    pub fn pause(&mut self) -> Result<()> {
        let (mut timer, completion) = self.restore();
        if let Some(completion) = completion {
            return self.resolve_completion(&mut timer, &completion);
        }

        match timer.pause() {
            Ok(remaining) => {
                timer.persist(&self.stores.sessions)?;
                writeln!(
                    self.out,
                    "{} Paused with {} remaining",
                    "⏸".yellow(),
                    format::clock(remaining).bold()
                )?;
                Ok(())
            }
            Err(e) => self.print_refusal(&e),
        }
    }

    pub fn resume(&mut self) -> Result<()> {
        let (mut timer, completion) = self.restore();
        if let Some(completion) = completion {
            return self.resolve_completion(&mut timer, &completion);
        }

        match timer.resume() {
            Ok(_) => {
                timer.persist(&self.stores.sessions)?;
                writeln!(self.out, "{} {} resumed", "▶".green(), timer.session_type().name())?;
                self.print_timer(&timer)
            }
            Err(e) => self.print_refusal(&e),
        }
    }

    pub fn stop(&mut self) -> Result<()> {
        let settings = self.stores.settings.get();
        let saved = self.stores.sessions.load();

        if recover(saved.clone(), &settings, self.clock.now()) == Recovered::Idle {
            // Drop a stale leftover along the way
            self.stores.sessions.clear()?;
            writeln!(self.out, "{} No timer to stop", "[info]".cyan())?;
            return Ok(());
        }

        // No alert for a session that ran out before the stop
        let (mut timer, _) = Timer::restore(
            settings,
            saved,
            Box::new(Rc::clone(&self.clock)),
            Box::new(NullNotifier),
        );
        timer.stop();
        timer.persist(&self.stores.sessions)?;

        writeln!(self.out, "{} Timer stopped and reset", "⏹".red())?;
        Ok(())
    }

    pub fn status(&mut self) -> Result<()> {
        let (mut timer, completion) = self.restore();
        if let Some(completion) = completion {
            return self.resolve_completion(&mut timer, &completion);
        }

        match timer.state() {
            TimerState::Idle => {
                writeln!(self.out, "No active timer")?;
                writeln!(self.out)?;
                writeln!(self.out, "Start one with: pomodoro start")?;
            }
            TimerState::AwaitingStart => {
                self.print_timer(&timer)?;
                writeln!(self.out)?;
                writeln!(self.out, "Run 'pomodoro start' to begin")?;
            }
            _ => self.print_timer(&timer)?,
        }
        Ok(())
    }

    pub fn skip(&mut self) -> Result<()> {
        let (mut timer, completion) = self.restore();
        if let Some(completion) = completion {
            return self.resolve_completion(&mut timer, &completion);
        }

        match timer.skip() {
            Ok(completion) => {
                writeln!(self.out, "{} Skipped {}", "⏭".cyan(), completion.finished.name())?;
                self.resolve_completion(&mut timer, &completion)
            }
            Err(e) => self.print_refusal(&e),
        }
    }

    pub fn config(&mut self, show: bool, reset: bool, update: SettingsUpdate) -> Result<()> {
        if reset {
            self.stores.settings.reset()?;
            writeln!(self.out, "{} Settings reset to defaults", "[ok]".green())?;
            return self.print_settings(&self.stores.settings.get());
        }

        if !update.is_empty() {
            let settings = self.stores.settings.set(&update)?;
            writeln!(self.out, "{} Settings updated", "[ok]".green())?;
            return self.print_settings(&settings);
        }

        if show {
            return self.print_settings(&self.stores.settings.get());
        }

        let mut cmd = Cli::command();
        if let Some(config) = cmd.find_subcommand_mut("config") {
            write!(self.out, "{}", config.render_help())?;
        }
        Ok(())
    }

    /// Save the completion, then ask whether to start the next session. With
    /// nobody to ask, the next session stays saved but unstarted.
    fn resolve_completion(&mut self, timer: &mut Timer, completion: &Completion) -> Result<()> {
        // Written before asking: an interrupted prompt must not undo the completion
        timer.persist(&self.stores.sessions)?;

        let next = completion.next;
        match (self.ask)(&format!("Ready to start {}?", next.name()))? {
            Some(true) => {
                timer.confirm(true)?;
                timer.persist(&self.stores.sessions)?;
                writeln!(self.out, "{} {} started", "▶".green(), next.name())?;
                self.print_timer(timer)
            }
            Some(false) => {
                timer.confirm(false)?;
                timer.persist(&self.stores.sessions)?;
                writeln!(self.out, "Timer reset. Run 'pomodoro start' when you're ready.")?;
                Ok(())
            }
            None => {
                timer.defer()?;
                timer.persist(&self.stores.sessions)?;
                writeln!(
                    self.out,
                    "{} {} {} is up next. Run 'pomodoro start' to begin.",
                    "[info]".cyan(),
                    next.emoji(),
                    next.name()
                )?;
                Ok(())
            }
        }
    }

    fn print_refusal(&mut self, e: &TimerError) -> Result<()> {
        writeln!(self.out, "{} {}", "[!]".yellow(), e)?;
        Ok(())
    }

    fn print_timer(&mut self, timer: &Timer) -> Result<()> {
        let session_type = timer.session_type();
        let remaining = timer.remaining_seconds();
        let total = timer.total_seconds();
        let settings = timer.settings();

        let status = match timer.state() {
            TimerState::Running => "RUNNING".green().bold(),
            TimerState::Paused => "PAUSED".yellow().bold(),
            state => state.label().dimmed(),
        };

        writeln!(self.out)?;
        writeln!(
            self.out,
            "{} {}  {}",
            session_type.emoji(),
            accent(session_type.name(), session_type).bold(),
            status
        )?;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "  {}  {}",
            "Remaining:".cyan(),
            accent(&format::clock(remaining), session_type).bold()
        )?;
        writeln!(
            self.out,
            "  {}   [{}] {}%",
            "Progress:".cyan(),
            accent(&format::progress_bar(remaining, total, BAR_WIDTH), session_type),
            format::progress_percent(remaining, total)
        )?;
        writeln!(
            self.out,
            "  {}     {}/{}",
            "Cycles:".cyan(),
            timer.completed_cycles(),
            settings.cycles_before_long_break
        )?;
        if timer.state() == TimerState::Running {
            let ends = timer.now() + Duration::seconds(remaining as i64);
            writeln!(
                self.out,
                "  {}    {}",
                "Ends at:".cyan(),
                format::time(ends.with_timezone(&Local))
            )?;
        }
        Ok(())
    }

    fn print_settings(&mut self, settings: &Settings) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "Settings".bold())?;
        writeln!(self.out, "  {}     {} min", "Work session:".cyan(), settings.work_minutes)?;
        writeln!(self.out, "  {}      {} min", "Short break:".cyan(), settings.short_break_minutes)?;
        writeln!(self.out, "  {}       {} min", "Long break:".cyan(), settings.long_break_minutes)?;
        writeln!(
            self.out,
            "  {} {}",
            "Cycles before long:".cyan(),
            settings.cycles_before_long_break
        )?;
        Ok(())
    }
}

/// Yes/no question on the terminal, defaulting to yes. Without a terminal, or
/// once stdin is closed, nobody answers.
fn ask_on_terminal(question: &str) -> Result<Option<bool>> {
    if !io::stdin().is_terminal() {
        return Ok(None);
    }

    print!("{} {} ", question, "[Y/n]".dimmed());
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        println!();
        return Ok(None);
    }

    let answer = input.trim();
    Ok(Some(
        answer.is_empty() || answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"),
    ))
}

fn accent(text: &str, session_type: SessionType) -> ColoredString {
    match session_type.accent() {
        Accent::Red => text.red(),
        Accent::Green => text.green(),
        Accent::Blue => text.blue(),
    }
}
