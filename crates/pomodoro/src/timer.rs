//! The session state machine
//!
//! ```text
//!            start                pause
//!   Idle ───────────► Running ◄──────────► Paused
//!   AwaitingStart ──►    │       resume      │
//!        ▲               │ expiry / skip     │ skip
//!        │ defer         ▼                   │
//!        └──── AwaitingConfirmation ◄────────┘
//!                 │ accept → Running
//!                 │ decline → Idle
//! ```
//!
//! `stop` returns to `Idle` from anywhere. Remaining time is derived from
//! `start_time` on every observation; nothing here counts down. The machine
//! never touches storage on its own, callers `persist` after each change.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tomato_core::{format, Settings};
use tomato_notify::Notifier;

use crate::clock::Clock;
use crate::error::TimerError;
use crate::recovery::{recover, Recovered};
use crate::session::{Session, SessionType};
use crate::store::SessionStore;

/// Observable timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    AwaitingStart,
    Running,
    Paused,
    AwaitingConfirmation,
}

impl TimerState {
    pub fn label(&self) -> &'static str {
        match self {
            TimerState::Idle => "IDLE",
            TimerState::AwaitingStart => "READY",
            TimerState::Running => "RUNNING",
            TimerState::Paused => "PAUSED",
            TimerState::AwaitingConfirmation => "FINISHED",
        }
    }

    /// A session is underway (counting or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, TimerState::Running | TimerState::Paused)
    }
}

/// What happened when a session finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub finished: SessionType,
    pub next: SessionType,
    pub completed_cycles: u32,
    pub title: String,
    pub body: String,
}

/// Cycle rule: the session that follows `finished`, and the new cycle count
pub fn next_session(
    finished: SessionType,
    completed_cycles: u32,
    cycles_before_long_break: u32,
) -> (SessionType, u32) {
    match finished {
        SessionType::Work => {
            let cycles = completed_cycles + 1;
            if cycles >= cycles_before_long_break {
                (SessionType::LongBreak, 0)
            } else {
                (SessionType::ShortBreak, cycles)
            }
        }
        SessionType::ShortBreak | SessionType::LongBreak => (SessionType::Work, completed_cycles),
    }
}

pub struct Timer {
    settings: Settings,
    session: Session,
    state: TimerState,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
}

impl Timer {
    /// A timer with nothing started: a full work session, zero cycles
    pub fn new(settings: Settings, clock: Box<dyn Clock>, notifier: Box<dyn Notifier>) -> Self {
        let session = Session::new(SessionType::Work, 0, &settings, clock.now());
        Self {
            settings,
            session,
            state: TimerState::Idle,
            clock,
            notifier,
        }
    }

    /// Rebuild the timer from a saved record.
    ///
    /// A session that ran out while no process was around is completed right
    /// away (notification included) and the completion is returned; the timer
    /// is then waiting for confirmation.
    pub fn restore(
        settings: Settings,
        saved: Option<Session>,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> (Self, Option<Completion>) {
        let had_record = saved.is_some();
        let recovered = recover(saved, &settings, clock.now());
        let mut timer = Self::new(settings, clock, notifier);

        let (session, state) = match recovered {
            Recovered::Idle => {
                if had_record {
                    tracing::debug!("discarding stale session");
                }
                return (timer, None);
            }
            Recovered::AwaitingStart(s) => (s, TimerState::AwaitingStart),
            Recovered::Running(s) => (s, TimerState::Running),
            Recovered::Paused(s) => (s, TimerState::Paused),
            Recovered::Expired(s) => {
                tracing::debug!("{} expired while closed", s.session_type.name());
                timer.session = s;
                timer.state = TimerState::Running;
                let completion = timer.complete();
                return (timer, Some(completion));
            }
        };

        tracing::debug!(
            "restored {} ({}), {}s remaining",
            session.session_type.name(),
            state.label(),
            session.remaining_seconds
        );
        timer.session = session;
        timer.state = state;
        (timer, None)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_type(&self) -> SessionType {
        self.session.session_type
    }

    pub fn completed_cycles(&self) -> u32 {
        self.session.completed_cycles
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Full length of the current session
    pub fn total_seconds(&self) -> u64 {
        self.session.total_seconds(&self.settings)
    }

    /// Time left, recomputed from the clock while running
    pub fn remaining_seconds(&self) -> u64 {
        self.session.remaining_at(&self.settings, self.clock.now())
    }

    pub fn progress_percent(&self) -> u32 {
        format::progress_percent(self.remaining_seconds(), self.total_seconds())
    }

    /// Start a fresh session, or continue a paused one
    pub fn start(&mut self) -> Result<(), TimerError> {
        match self.state {
            TimerState::Idle | TimerState::AwaitingStart => {
                self.begin();
                Ok(())
            }
            TimerState::Paused => self.resume().map(|_| ()),
            TimerState::Running => Err(TimerError::AlreadyRunning),
            TimerState::AwaitingConfirmation => Err(TimerError::AwaitingConfirmation),
        }
    }

    /// Freeze the countdown; returns the remaining seconds
    pub fn pause(&mut self) -> Result<u64, TimerError> {
        match self.state {
            TimerState::Running => {}
            TimerState::Paused => return Err(TimerError::AlreadyPaused),
            _ => return Err(TimerError::NotRunning),
        }

        let now = self.clock.now();
        self.session.remaining_seconds = self.session.remaining_at(&self.settings, now);
        self.session.is_paused = true;
        self.session.paused_at = Some(now);
        self.state = TimerState::Paused;

        tracing::debug!("paused with {}s remaining", self.session.remaining_seconds);
        Ok(self.session.remaining_seconds)
    }

    /// Continue counting; the paused interval does not count as elapsed
    pub fn resume(&mut self) -> Result<u64, TimerError> {
        if self.state != TimerState::Paused {
            return Err(TimerError::NotPaused);
        }

        let now = self.clock.now();
        let start_time = match (self.session.start_time, self.session.paused_at) {
            (Some(start), Some(paused_at)) => {
                let gap = now.signed_duration_since(paused_at).max(Duration::zero());
                start + gap
            }
            _ => {
                let elapsed = self.total_seconds().saturating_sub(self.session.remaining_seconds);
                now - Duration::seconds(elapsed as i64)
            }
        };

        self.session.start_time = Some(start_time);
        self.session.is_paused = false;
        self.session.paused_at = None;
        self.state = TimerState::Running;
        self.session.remaining_seconds = self.session.remaining_at(&self.settings, now);

        tracing::debug!("resumed with {}s remaining", self.session.remaining_seconds);
        Ok(self.session.remaining_seconds)
    }

    /// Observation point: completes the session if its time is up
    pub fn check_expiry(&mut self) -> Option<Completion> {
        if self.state != TimerState::Running {
            return None;
        }

        self.session.remaining_seconds = self.remaining_seconds();
        if self.session.remaining_seconds == 0 {
            Some(self.complete())
        } else {
            None
        }
    }

    /// Finish the current session now, whatever time is left
    pub fn skip(&mut self) -> Result<Completion, TimerError> {
        if !self.state.is_active() {
            return Err(TimerError::NotRunning);
        }
        Ok(self.complete())
    }

    /// Answer the "start the next session?" question
    pub fn confirm(&mut self, accept: bool) -> Result<(), TimerError> {
        if self.state != TimerState::AwaitingConfirmation {
            return Err(TimerError::NotAwaitingConfirmation);
        }

        if accept {
            self.begin();
        } else {
            tracing::debug!("next session declined");
            self.state = TimerState::Idle;
        }
        Ok(())
    }

    /// Leave the question unanswered; the next session waits for `start`
    pub fn defer(&mut self) -> Result<(), TimerError> {
        if self.state != TimerState::AwaitingConfirmation {
            return Err(TimerError::NotAwaitingConfirmation);
        }
        self.state = TimerState::AwaitingStart;
        Ok(())
    }

    /// Drop everything and go back to a fresh work session
    pub fn stop(&mut self) {
        self.session = Session::new(SessionType::Work, 0, &self.settings, self.clock.now());
        self.state = TimerState::Idle;
        tracing::debug!("timer stopped");
    }

    /// Write the current state to `store`; `Idle` clears it
    pub fn persist(&self, store: &dyn SessionStore) -> Result<()> {
        if self.state == TimerState::Idle {
            return store.clear();
        }

        let mut record = self.session.clone();
        record.remaining_seconds = self.remaining_seconds();
        store.save(&record)
    }

    fn begin(&mut self) {
        let now = self.clock.now();
        self.session.remaining_seconds = self.total_seconds();
        self.session.is_running = true;
        self.session.is_paused = false;
        self.session.start_time = Some(now);
        self.session.paused_at = None;
        self.state = TimerState::Running;

        tracing::debug!(
            "{} started, {}s",
            self.session.session_type.name(),
            self.session.remaining_seconds
        );
    }

    fn complete(&mut self) -> Completion {
        let finished = self.session.session_type;
        let info = finished.info();
        let title = format!("{} Complete! {}", info.name, info.emoji);
        let body = info.finished_message.to_string();

        self.notifier.notify(&title, &body, true);

        let (next, cycles) = next_session(
            finished,
            self.session.completed_cycles,
            self.settings.cycles_before_long_break,
        );
        self.session = Session::new(next, cycles, &self.settings, self.clock.now());
        self.state = TimerState::AwaitingConfirmation;

        tracing::debug!("{} complete, next up {} (cycles {})", info.name, next.name(), cycles);

        Completion {
            finished,
            next,
            completed_cycles: cycles,
            title,
            body,
        }
    }
}
