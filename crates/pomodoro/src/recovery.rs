//! Load-time reconciliation of a saved session with the current time
//!
//! Every command runs in a fresh process, so the saved record is all there is.
//! `recover` decides what the record means *now*: still counting, paused,
//! waiting to be started, finished while nobody was watching, or too old to
//! care about. It is a pure function of its inputs.

use chrono::{DateTime, Duration, Utc};
use tomato_core::Settings;

use crate::session::Session;

/// Records last written longer ago than this are dropped
pub const STALE_AFTER_HOURS: i64 = 24;

/// Outcome of reconciling a saved session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovered {
    /// Nothing saved, or the record was stale
    Idle,
    /// A session exists but was never started (or its predecessor just ended)
    AwaitingStart(Session),
    /// Counting down; `remaining_seconds` is fresh as of `now`
    Running(Session),
    /// Paused; `remaining_seconds` is the saved value
    Paused(Session),
    /// Reached zero while no process was observing it
    Expired(Session),
}

impl Recovered {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Recovered::Idle => None,
            Recovered::AwaitingStart(s)
            | Recovered::Running(s)
            | Recovered::Paused(s)
            | Recovered::Expired(s) => Some(s),
        }
    }
}

/// Whether a record is past the staleness window
pub fn is_stale(session: &Session, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(session.saved_at) > Duration::hours(STALE_AFTER_HOURS)
}

/// Reconcile `saved` with `now`
pub fn recover(saved: Option<Session>, settings: &Settings, now: DateTime<Utc>) -> Recovered {
    let Some(mut session) = saved else {
        return Recovered::Idle;
    };

    if is_stale(&session, now) {
        return Recovered::Idle;
    }

    // Settings may have shrunk the cycle threshold since the record was written
    let max_cycles = settings.cycles_before_long_break.saturating_sub(1);
    session.completed_cycles = session.completed_cycles.min(max_cycles);

    let total = session.total_seconds(settings);

    if !session.is_running {
        session.is_paused = false;
        session.paused_at = None;
        // An unstarted session always begins from its full length
        session.remaining_seconds = total;
        return Recovered::AwaitingStart(session);
    }

    if session.is_paused {
        session.remaining_seconds = session.remaining_seconds.min(total);
        return Recovered::Paused(session);
    }

    if session.start_time.is_none() {
        // Without a start time the snapshot is all we have; count on from now
        let remaining = session.remaining_seconds.min(total);
        let elapsed = (total - remaining) as i64;
        session.start_time = Some(now - Duration::seconds(elapsed));
    }

    session.remaining_seconds = session.remaining_at(settings, now);
    if session.remaining_seconds == 0 {
        Recovered::Expired(session)
    } else {
        Recovered::Running(session)
    }
}
