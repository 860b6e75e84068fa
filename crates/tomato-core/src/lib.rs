//! Tomato Core - Shared functionality for the Tomato Pomodoro tools
//!
//! Paths, the settings provider, formatting helpers and logging setup used by
//! both the one-shot CLI and the interactive timer.

pub mod config;
pub mod format;
pub mod logging;
pub mod paths;

pub use config::{Settings, SettingsStore, SettingsUpdate};
pub use paths::Paths;
