//! Session types and the persisted session record
//!
//! A session is one work, short break or long break interval. While it runs
//! only `start_time` is trusted: the remaining time is always recomputed from
//! the wall clock, so nothing has to tick while no process is alive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tomato_core::Settings;

/// Kind of interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    /// Focused work, counts towards the long break
    #[default]
    Work,
    /// Short rest after a work session
    ShortBreak,
    /// Long rest after `cycles_before_long_break` work sessions
    LongBreak,
}

/// Accent color used by both front ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Red,
    Green,
    Blue,
}

/// Presentation and duration lookup for a session type
pub struct SessionInfo {
    pub name: &'static str,
    pub emoji: &'static str,
    pub accent: Accent,
    /// Notification body shown when this session type finishes
    pub finished_message: &'static str,
    minutes: fn(&Settings) -> u32,
}

fn work_minutes(settings: &Settings) -> u32 {
    settings.work_minutes
}

fn short_break_minutes(settings: &Settings) -> u32 {
    settings.short_break_minutes
}

fn long_break_minutes(settings: &Settings) -> u32 {
    settings.long_break_minutes
}

/// Indexed by `SessionType as usize`
static SESSION_INFO: [SessionInfo; 3] = [
    SessionInfo {
        name: "Work Session",
        emoji: "🍅",
        accent: Accent::Red,
        finished_message: "Time for a break! Great work! 🎉",
        minutes: work_minutes,
    },
    SessionInfo {
        name: "Short Break",
        emoji: "☕",
        accent: Accent::Green,
        finished_message: "Break's over! Ready to focus? 💪",
        minutes: short_break_minutes,
    },
    SessionInfo {
        name: "Long Break",
        emoji: "🌴",
        accent: Accent::Blue,
        finished_message: "Break's over! Ready to focus? 💪",
        minutes: long_break_minutes,
    },
];

impl SessionType {
    pub fn info(self) -> &'static SessionInfo {
        &SESSION_INFO[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn emoji(self) -> &'static str {
        self.info().emoji
    }

    pub fn accent(self) -> Accent {
        self.info().accent
    }

    /// Configured length in minutes
    pub fn minutes(self, settings: &Settings) -> u32 {
        (self.info().minutes)(settings)
    }

    /// Configured length in seconds
    pub fn seconds(self, settings: &Settings) -> u64 {
        u64::from(self.minutes(settings)) * 60
    }
}

/// The single persisted session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_type: SessionType,
    /// Work sessions finished since the last long break
    #[serde(default)]
    pub completed_cycles: u32,
    /// Authoritative only while paused or not running
    #[serde(default)]
    pub remaining_seconds: u64,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub is_paused: bool,
    /// When the running interval began, shifted forward by any pauses
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// Last write time; only used to discard stale records
    pub saved_at: DateTime<Utc>,
}

impl Session {
    /// A not-yet-started session of the given type with its full duration
    pub fn new(
        session_type: SessionType,
        completed_cycles: u32,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_type,
            completed_cycles,
            remaining_seconds: session_type.seconds(settings),
            is_running: false,
            is_paused: false,
            start_time: None,
            paused_at: None,
            saved_at: now,
        }
    }

    /// Full length of this session
    pub fn total_seconds(&self, settings: &Settings) -> u64 {
        self.session_type.seconds(settings)
    }

    /// Whole seconds since `start_time`; a clock that went backwards counts as zero
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.start_time {
            Some(start) => now.signed_duration_since(start).num_seconds().max(0) as u64,
            None => 0,
        }
    }

    /// Remaining time as of `now`, recomputed when the session is counting down
    pub fn remaining_at(&self, settings: &Settings, now: DateTime<Utc>) -> u64 {
        if self.is_running && !self.is_paused && self.start_time.is_some() {
            self.total_seconds(settings)
                .saturating_sub(self.elapsed_seconds(now))
        } else {
            self.remaining_seconds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_lookup_table_matches_variants() {
        assert_eq!(SessionType::Work.name(), "Work Session");
        assert_eq!(SessionType::ShortBreak.name(), "Short Break");
        assert_eq!(SessionType::LongBreak.name(), "Long Break");
        assert_eq!(SessionType::Work.emoji(), "🍅");
        assert_eq!(SessionType::ShortBreak.accent(), Accent::Green);
        assert_eq!(SessionType::LongBreak.accent(), Accent::Blue);
    }

    #[test]
    fn test_durations_follow_settings() {
        let settings = Settings {
            work_minutes: 50,
            short_break_minutes: 10,
            long_break_minutes: 30,
            cycles_before_long_break: 3,
        };
        assert_eq!(SessionType::Work.seconds(&settings), 3000);
        assert_eq!(SessionType::ShortBreak.seconds(&settings), 600);
        assert_eq!(SessionType::LongBreak.seconds(&settings), 1800);
    }

    #[test]
    fn test_serialized_field_names() {
        let session = Session::new(SessionType::ShortBreak, 2, &Settings::default(), t0());
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["sessionType"], "shortBreak");
        assert_eq!(json["completedCycles"], 2);
        assert_eq!(json["remainingSeconds"], 300);
        assert_eq!(json["isRunning"], false);
        assert!(json["startTime"].is_null());
        assert!(json.get("savedAt").is_some());
    }

    #[test]
    fn test_remaining_recomputed_only_while_counting() {
        let settings = Settings::default();
        let mut session = Session::new(SessionType::Work, 0, &settings, t0());
        session.is_running = true;
        session.start_time = Some(t0());
        session.remaining_seconds = 1500;

        let later = t0() + Duration::seconds(90);
        assert_eq!(session.remaining_at(&settings, later), 1410);

        session.is_paused = true;
        assert_eq!(session.remaining_at(&settings, later), 1500);
    }

    #[test]
    fn test_clock_moving_backwards_counts_as_no_elapsed_time() {
        let mut session = Session::new(SessionType::Work, 0, &Settings::default(), t0());
        session.start_time = Some(t0());
        assert_eq!(session.elapsed_seconds(t0() - Duration::minutes(5)), 0);
    }
}
