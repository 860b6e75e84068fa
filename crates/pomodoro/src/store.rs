//! Session storage
//!
//! Exactly one session record is kept. Every save replaces the whole record
//! and stamps `saved_at`; there is no locking between processes, the last
//! writer wins.
//! - File store: ~/.local/share/tomato/session.json

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tomato_core::Settings;

use crate::clock::{Clock, SystemClock};
use crate::recovery::{recover, Recovered};
use crate::session::Session;

/// Durable home of the singleton session record
pub trait SessionStore {
    /// Read the record, reporting I/O and parse problems
    fn try_load(&self) -> Result<Option<Session>>;

    /// Overwrite the record, stamping `saved_at` with the current time
    fn save(&self, session: &Session) -> Result<()>;

    /// Delete the record
    fn clear(&self) -> Result<()>;

    /// Read the record; an unreadable store counts as empty
    fn load(&self) -> Option<Session> {
        match self.try_load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("{:#}; starting without a saved session", e);
                None
            }
        }
    }

    /// Whether a saved session would be resumed (neither stale nor expired)
    fn has_active(&self, settings: &Settings, now: DateTime<Utc>) -> bool {
        !matches!(
            recover(self.load(), settings, now),
            Recovered::Idle | Recovered::Expired(_)
        )
    }
}

/// JSON file store
pub struct FileSessionStore {
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl FileSessionStore {
    /// Store the session at `path`, creating the parent directory
    pub fn new(path: &Path) -> Result<Self> {
        Self::with_clock(path, Box::new(SystemClock))
    }

    pub fn with_clock(path: &Path, clock: Box<dyn Clock>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn try_load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let session: Session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session: {}", self.path.display()))?;

        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut record = session.clone();
        record.saved_at = self.clock.now();

        let content = serde_json::to_string_pretty(&record).context("Failed to serialize session")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session: {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store
pub struct MemorySessionStore {
    record: RefCell<Option<Session>>,
    clock: Box<dyn Clock>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            record: RefCell::new(None),
            clock,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn try_load(&self) -> Result<Option<Session>> {
        Ok(self.record.borrow().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut record = session.clone();
        record.saved_at = self.clock.now();
        *self.record.borrow_mut() = Some(record);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.record.borrow_mut().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::SessionType;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 17, 10, 0, 0).unwrap()
    }

    fn temp_store() -> (FileSessionStore, ManualClock, TempDir) {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new(t0());
        let store =
            FileSessionStore::with_clock(&dir.path().join("data").join("session.json"), Box::new(clock.clone()))
                .unwrap();
        (store, clock, dir)
    }

    fn running_session() -> Session {
        let mut session = Session::new(SessionType::Work, 2, &Settings::default(), t0());
        session.is_running = true;
        session.start_time = Some(t0());
        session
    }

    #[test]
    fn test_no_saved_session() {
        let (store, _clock, _dir) = temp_store();
        assert!(store.try_load().unwrap().is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_stamps_saved_at_and_loads_back() {
        let (store, clock, _dir) = temp_store();
        clock.advance(42);

        let session = running_session();
        store.save(&session).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.saved_at, t0() + Duration::seconds(42));
        assert_eq!(loaded.session_type, SessionType::Work);
        assert_eq!(loaded.completed_cycles, 2);
        assert_eq!(loaded.start_time, Some(t0()));
    }

    #[test]
    fn test_save_overwrites_whole_record() {
        let (store, _clock, _dir) = temp_store();
        let mut session = running_session();
        session.is_paused = true;
        session.paused_at = Some(t0());
        store.save(&session).unwrap();

        let fresh = Session::new(SessionType::ShortBreak, 3, &Settings::default(), t0());
        store.save(&fresh).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.session_type, SessionType::ShortBreak);
        assert!(!loaded.is_paused);
        assert!(loaded.paused_at.is_none());
    }

    #[test]
    fn test_clear_session() {
        let (store, _clock, _dir) = temp_store();
        store.save(&running_session()).unwrap();
        assert!(store.load().is_some());

        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let (store, _clock, _dir) = temp_store();
        fs::write(store.path(), "{ definitely not a session").unwrap();

        assert!(store.try_load().is_err());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_has_active() {
        let (store, clock, _dir) = temp_store();
        let settings = Settings::default();
        assert!(!store.has_active(&settings, clock.now()));

        store.save(&running_session()).unwrap();
        assert!(store.has_active(&settings, clock.now()));

        // Past the end of the work session
        clock.advance(26 * 60);
        assert!(!store.has_active(&settings, clock.now()));
    }

    #[test]
    fn test_stale_record_is_not_active() {
        let (store, clock, _dir) = temp_store();
        let mut session = running_session();
        session.is_paused = true;
        store.save(&session).unwrap();

        clock.advance(25 * 3600);
        assert!(!store.has_active(&Settings::default(), clock.now()));
    }

    #[test]
    fn test_memory_store() {
        let clock = ManualClock::new(t0());
        let store = MemorySessionStore::with_clock(Box::new(clock.clone()));
        assert!(store.load().is_none());

        clock.advance(5);
        store.save(&running_session()).unwrap();
        assert_eq!(store.load().unwrap().saved_at, t0() + Duration::seconds(5));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}
