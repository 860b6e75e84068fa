//! Timer settings
//!
//! Four positive integers: work, short break and long break durations in
//! minutes, and how many work sessions come before a long break. Stored as
//! JSON next to the rest of the Tomato config; anything missing, zero or
//! unreadable falls back to the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
pub const DEFAULT_CYCLES_BEFORE_LONG_BREAK: u32 = 4;

/// Pomodoro durations and cycle threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Work session length (minutes)
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    /// Short break length (minutes)
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,

    /// Long break length (minutes)
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,

    /// Work sessions completed before a long break
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,
}

fn default_work_minutes() -> u32 {
    DEFAULT_WORK_MINUTES
}

fn default_short_break_minutes() -> u32 {
    DEFAULT_SHORT_BREAK_MINUTES
}

fn default_long_break_minutes() -> u32 {
    DEFAULT_LONG_BREAK_MINUTES
}

fn default_cycles_before_long_break() -> u32 {
    DEFAULT_CYCLES_BEFORE_LONG_BREAK
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            cycles_before_long_break: DEFAULT_CYCLES_BEFORE_LONG_BREAK,
        }
    }
}

impl Settings {
    /// Replace any zero field with its default
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let or_default = |value: u32, fallback: u32| if value == 0 { fallback } else { value };
        Self {
            work_minutes: or_default(self.work_minutes, defaults.work_minutes),
            short_break_minutes: or_default(self.short_break_minutes, defaults.short_break_minutes),
            long_break_minutes: or_default(self.long_break_minutes, defaults.long_break_minutes),
            cycles_before_long_break: or_default(
                self.cycles_before_long_break,
                defaults.cycles_before_long_break,
            ),
        }
    }

    /// Apply a partial update, keeping only positive values
    pub fn apply(&mut self, update: &SettingsUpdate) -> bool {
        let mut changed = false;
        let mut put = |slot: &mut u32, value: Option<i64>| {
            if let Some(v) = value.filter(|v| *v > 0).and_then(|v| u32::try_from(v).ok()) {
                *slot = v;
                changed = true;
            }
        };
        put(&mut self.work_minutes, update.work_minutes);
        put(&mut self.short_break_minutes, update.short_break_minutes);
        put(&mut self.long_break_minutes, update.long_break_minutes);
        put(&mut self.cycles_before_long_break, update.cycles_before_long_break);
        changed
    }
}

/// A partial settings change; absent, zero and negative values are ignored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub work_minutes: Option<i64>,
    pub short_break_minutes: Option<i64>,
    pub long_break_minutes: Option<i64>,
    pub cycles_before_long_break: Option<i64>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.work_minutes.is_none()
            && self.short_break_minutes.is_none()
            && self.long_break_minutes.is_none()
            && self.cycles_before_long_break.is_none()
    }
}

/// File-backed settings provider
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from file
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", self.path.display()))?;
        Ok(settings.sanitized())
    }

    /// Current settings; an unreadable file yields the defaults
    pub fn get(&self) -> Settings {
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{:#}; using default settings", e);
                Settings::default()
            }
        }
    }

    /// Apply a partial update and save the result
    pub fn set(&self, update: &SettingsUpdate) -> Result<Settings> {
        let mut settings = self.get();
        if settings.apply(update) {
            self.save(&settings)?;
        } else {
            tracing::debug!("settings update had no positive values, nothing written");
        }
        Ok(settings)
    }

    /// Restore defaults by removing the settings file
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove settings: {}", self.path.display()))?;
        }
        Ok(())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings: {}", self.path.display()))
    }
}
