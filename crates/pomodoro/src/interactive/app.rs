//! Application state and command handling

use anyhow::Result;
use chrono::{DateTime, Local};

use pomodoro::{Completion, SessionStore, Timer, TimerState};
use tomato_core::format;

/// Oldest messages are dropped past this
const MAX_MESSAGES: usize = 200;

/// How a message is colored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A line in the message pane
#[derive(Debug, Clone)]
pub struct Message {
    pub timestamp: DateTime<Local>,
    pub kind: MessageKind,
    pub text: String,
}

/// Application state
pub struct App {
    pub timer: Timer,
    store: Box<dyn SessionStore>,
    pub messages: Vec<Message>,
    pub input: String,
    pub should_quit: bool,
    /// An active session was written on the way out
    pub saved_on_exit: bool,
}

impl App {
    /// Wrap a restored timer; `completion` is a session that ended while closed
    pub fn new(timer: Timer, store: Box<dyn SessionStore>, completion: Option<Completion>) -> Result<Self> {
        let mut app = Self {
            timer,
            store,
            messages: Vec::new(),
            input: String::new(),
            should_quit: false,
            saved_on_exit: false,
        };

        if let Some(completion) = completion {
            app.push(
                MessageKind::Success,
                format!("Welcome back! {} ended while you were away.", completion.finished.name()),
            );
            app.announce(&completion)?;
            return Ok(app);
        }

        match app.timer.state() {
            TimerState::Idle => {
                app.push(MessageKind::Info, "Welcome to 🍅 Tomato Pomodoro! Type /help for commands.");
                app.push(MessageKind::Info, "Type /start to begin your first session.");
            }
            _ => {
                app.push(MessageKind::Success, "Welcome back! Session restored from previous run.");
                app.push(
                    MessageKind::Info,
                    format!(
                        "Current: {} - {} remaining",
                        app.timer.session_type().name(),
                        format::clock(app.timer.remaining_seconds())
                    ),
                );
                if app.timer.state() != TimerState::Running {
                    app.push(MessageKind::Info, "Type /start to continue or /stop to reset.");
                }
            }
        }
        Ok(app)
    }

    #[cfg(test)]
    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    /// The y/n question for the next session is open
    pub fn confirming(&self) -> bool {
        self.timer.state() == TimerState::AwaitingConfirmation
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Handle the current input line
    pub fn submit(&mut self) -> Result<()> {
        let line = std::mem::take(&mut self.input);
        self.handle_input(&line)
    }

    /// Dispatch one line of input
    pub fn handle_input(&mut self, line: &str) -> Result<()> {
        let line = line.trim().to_lowercase();
        if line.is_empty() {
            return Ok(());
        }

        if self.confirming() {
            return self.handle_answer(&line);
        }

        if !line.starts_with('/') {
            self.push(MessageKind::Warning, "Commands start with /. Type /help for the list.");
            return Ok(());
        }

        match line.as_str() {
            "/start" => self.cmd_start(),
            "/pause" => self.cmd_pause(),
            "/resume" => self.cmd_resume(),
            "/stop" => self.cmd_stop(),
            "/skip" => self.cmd_skip(),
            "/status" => {
                self.cmd_status();
                Ok(())
            }
            "/config" => {
                self.cmd_config();
                Ok(())
            }
            "/help" => {
                self.cmd_help();
                Ok(())
            }
            "/exit" | "/quit" => self.save_and_exit(),
            other => {
                self.push(
                    MessageKind::Error,
                    format!("Unknown command: {}. Type /help for available commands.", other),
                );
                Ok(())
            }
        }
    }

    /// One-second tick: observe the clock, complete on expiry
    pub fn on_tick(&mut self) -> Result<()> {
        if let Some(completion) = self.timer.check_expiry() {
            self.announce(&completion)?;
        }
        Ok(())
    }

    /// Save an active session and leave
    pub fn save_and_exit(&mut self) -> Result<()> {
        if self.timer.state() != TimerState::Idle {
            self.persist()?;
            self.saved_on_exit = true;
            self.push(MessageKind::Success, "Session saved! Will resume next time.");
        }
        self.should_quit = true;
        Ok(())
    }

    fn handle_answer(&mut self, answer: &str) -> Result<()> {
        match answer {
            "y" | "yes" => {
                self.timer.confirm(true)?;
                self.persist()?;
                self.messages.clear();
                self.push(
                    MessageKind::Success,
                    format!("Starting {}...", self.timer.session_type().name()),
                );
            }
            "n" | "no" => {
                self.timer.confirm(false)?;
                self.persist()?;
                self.push(MessageKind::Info, "Timer stopped. Type /start to begin again.");
            }
            _ => {
                self.push(
                    MessageKind::Warning,
                    format!("Ready for {}? (y/n)", self.timer.session_type().name()),
                );
            }
        }
        Ok(())
    }

    fn cmd_start(&mut self) -> Result<()> {
        let was_paused = self.timer.state() == TimerState::Paused;
        match self.timer.start() {
            Ok(()) => {
                self.persist()?;
                let text = if was_paused {
                    "🍅 Session resumed! Stay focused! 🚀".to_string()
                } else {
                    format!("{} {} started!", self.timer.session_type().emoji(), self.timer.session_type().name())
                };
                self.push(MessageKind::Success, text);
            }
            Err(e) => self.push(MessageKind::Error, e.to_string()),
        }
        Ok(())
    }

    fn cmd_pause(&mut self) -> Result<()> {
        match self.timer.pause() {
            Ok(_) => {
                self.persist()?;
                self.push(MessageKind::Warning, "⏸  Timer paused");
            }
            Err(e) => self.push(MessageKind::Error, e.to_string()),
        }
        Ok(())
    }

    fn cmd_resume(&mut self) -> Result<()> {
        match self.timer.resume() {
            Ok(_) => {
                self.persist()?;
                self.push(MessageKind::Success, "▶  Timer resumed");
            }
            Err(e) => self.push(MessageKind::Error, e.to_string()),
        }
        Ok(())
    }

    fn cmd_stop(&mut self) -> Result<()> {
        self.timer.stop();
        self.persist()?;
        self.push(MessageKind::Warning, "⏹  Timer stopped and reset");
        Ok(())
    }

    fn cmd_skip(&mut self) -> Result<()> {
        match self.timer.skip() {
            Ok(completion) => {
                self.push(MessageKind::Info, format!("⏭  Skipped {}", completion.finished.name()));
                self.announce(&completion)?;
            }
            Err(_) => self.push(MessageKind::Error, "No active timer to skip"),
        }
        Ok(())
    }

    fn cmd_status(&mut self) {
        let text = format!(
            "Status: {} | {} | {} remaining | Cycles: {}/{}",
            self.timer.state().label(),
            self.timer.session_type().name(),
            format::clock(self.timer.remaining_seconds()),
            self.timer.completed_cycles(),
            self.timer.settings().cycles_before_long_break
        );
        self.push(MessageKind::Info, text);
    }

    fn cmd_config(&mut self) {
        let settings = *self.timer.settings();
        self.push(
            MessageKind::Info,
            format!(
                "Work: {}min | Short: {}min | Long: {}min | Long break every {} sessions",
                settings.work_minutes,
                settings.short_break_minutes,
                settings.long_break_minutes,
                settings.cycles_before_long_break
            ),
        );
        self.push(MessageKind::Info, "Change with: pomodoro config -w/-s/-l/-c");
    }

    fn cmd_help(&mut self) {
        const HELP: [&str; 10] = [
            "🍅 Tomato Pomodoro Commands:",
            "  /start  - Start/Resume the timer",
            "  /pause  - Pause the timer",
            "  /resume - Resume a paused timer",
            "  /stop   - Stop and reset timer",
            "  /skip   - Skip to next session",
            "  /status - Show current status",
            "  /config - Show configuration",
            "  /exit   - Save & exit (auto-resumes next time)",
            "  /help   - Show this help",
        ];
        for line in HELP {
            self.push(MessageKind::Info, line);
        }
    }

    /// Report a completion and open the y/n question
    fn announce(&mut self, completion: &Completion) -> Result<()> {
        self.persist()?;
        self.push(
            MessageKind::Success,
            format!("{}  {}", completion.title, completion.body),
        );
        self.push(
            MessageKind::Info,
            format!("Ready for {}? (y/n)", completion.next.name()),
        );
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.timer.persist(self.store.as_ref())
    }

    fn push(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.messages.push(Message {
            timestamp: Local::now(),
            kind,
            text: text.into(),
        });

        if self.messages.len() > MAX_MESSAGES {
            self.messages.drain(0..self.messages.len() - MAX_MESSAGES);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pomodoro::{ManualClock, MemorySessionStore, Session, SessionType};
    use std::rc::Rc;
    use tomato_core::Settings;
    use tomato_notify::RecordingNotifier;

    struct Harness {
        app: App,
        clock: ManualClock,
        notifier: Rc<RecordingNotifier>,
    }

    fn harness_from(saved: Option<Session>) -> Harness {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap());
        let notifier = Rc::new(RecordingNotifier::new());
        let (timer, completion) = Timer::restore(
            Settings::default(),
            saved,
            Box::new(clock.clone()),
            Box::new(notifier.clone()),
        );
        let store = MemorySessionStore::with_clock(Box::new(clock.clone()));
        let app = App::new(timer, Box::new(store), completion).unwrap();
        Harness { app, clock, notifier }
    }

    fn harness() -> Harness {
        harness_from(None)
    }

    fn last(app: &App) -> &Message {
        app.messages.last().unwrap()
    }

    #[test]
    fn test_welcome_without_saved_session() {
        let h = harness();
        assert_eq!(h.app.timer.state(), TimerState::Idle);
        assert!(h.app.messages[0].text.contains("Welcome to"));
        assert!(!h.app.confirming());
    }

    #[test]
    fn test_start_then_pause_persists() {
        let mut h = harness();
        h.app.handle_input("/start").unwrap();
        assert_eq!(h.app.timer.state(), TimerState::Running);
        assert!(h.app.store().load().unwrap().is_running);

        h.clock.advance(60);
        h.app.handle_input("/pause").unwrap();
        let saved = h.app.store().load().unwrap();
        assert!(saved.is_paused);
        assert_eq!(saved.remaining_seconds, 1440);
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        let mut h = harness();
        h.app.handle_input("  /START ").unwrap();
        assert_eq!(h.app.timer.state(), TimerState::Running);
    }

    #[test]
    fn test_illegal_command_reports_error() {
        let mut h = harness();
        h.app.handle_input("/resume").unwrap();
        assert_eq!(last(&h.app).kind, MessageKind::Error);
        assert_eq!(last(&h.app).text, "No paused timer to resume!");
        assert_eq!(h.app.timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_unknown_command() {
        let mut h = harness();
        h.app.handle_input("/dance").unwrap();
        assert_eq!(last(&h.app).kind, MessageKind::Error);
        assert!(last(&h.app).text.contains("Unknown command: /dance"));
    }

    #[test]
    fn test_tick_completes_and_asks() {
        let mut h = harness();
        h.app.handle_input("/start").unwrap();

        h.clock.advance(1499);
        h.app.on_tick().unwrap();
        assert!(!h.app.confirming());

        h.clock.advance(1);
        h.app.on_tick().unwrap();
        assert!(h.app.confirming());
        assert_eq!(h.notifier.sent().len(), 1);
        assert_eq!(last(&h.app).text, "Ready for Short Break? (y/n)");

        // Anything but y/n re-asks
        h.app.handle_input("/start").unwrap();
        assert!(h.app.confirming());

        h.app.handle_input("y").unwrap();
        assert_eq!(h.app.timer.state(), TimerState::Running);
        assert_eq!(h.app.timer.session_type(), SessionType::ShortBreak);
        assert_eq!(h.app.messages.len(), 1);
    }

    #[test]
    fn test_declining_clears_saved_session() {
        let mut h = harness();
        h.app.handle_input("/start").unwrap();
        h.app.handle_input("/skip").unwrap();
        assert!(h.app.store().load().is_some());

        h.app.handle_input("no").unwrap();
        assert_eq!(h.app.timer.state(), TimerState::Idle);
        assert!(h.app.store().load().is_none());
    }

    #[test]
    fn test_idle_ticks_do_not_write() {
        let mut h = harness();
        for _ in 0..3 {
            h.clock.advance(1);
            h.app.on_tick().unwrap();
        }
        assert!(h.app.store().load().is_none());
    }

    #[test]
    fn test_exit_saves_active_session() {
        let mut h = harness();
        h.app.handle_input("/start").unwrap();
        h.clock.advance(30);
        h.app.handle_input("/quit").unwrap();

        assert!(h.app.should_quit);
        assert!(h.app.saved_on_exit);
        assert_eq!(h.app.store().load().unwrap().remaining_seconds, 1470);
    }

    #[test]
    fn test_exit_when_idle_writes_nothing() {
        let mut h = harness();
        h.app.save_and_exit().unwrap();
        assert!(h.app.should_quit);
        assert!(!h.app.saved_on_exit);
    }

    #[test]
    fn test_restored_expired_session_asks_right_away() {
        let settings = Settings::default();
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let mut saved = Session::new(SessionType::Work, 0, &settings, start);
        saved.is_running = true;
        saved.start_time = Some(start);
        saved.saved_at = start;

        let h = harness_from(Some(saved));
        assert!(h.app.confirming());
        assert_eq!(h.notifier.sent().len(), 1);
        assert!(h.app.messages[0].text.contains("ended while you were away"));
    }

    #[test]
    fn test_submit_takes_input_buffer() {
        let mut h = harness();
        for c in "/stat".chars() {
            h.app.push_char(c);
        }
        h.app.push_char('x');
        h.app.backspace();
        h.app.push_char('u');
        h.app.push_char('s');
        h.app.submit().unwrap();
        assert!(h.app.input.is_empty());
        assert!(last(&h.app).text.starts_with("Status: IDLE"));
    }
}
