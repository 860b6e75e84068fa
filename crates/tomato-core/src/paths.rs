//! Standard paths used by Tomato tools

use std::path::{Path, PathBuf};

/// Environment variable that relocates all Tomato state under one root
pub const HOME_ENV: &str = "TOMATO_HOME";

/// Standard Tomato paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory (~/.local/share/tomato)
    pub data: PathBuf,
    /// Config directory (~/.config/tomato)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Self::under(Path::new(&root));
        }

        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("tomato");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("tomato");

        Self { data, config }
    }

    /// Paths rooted at a single directory
    pub fn under(root: &Path) -> Self {
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Persisted session record
    pub fn session_file(&self) -> PathBuf {
        self.data.join("session.json")
    }

    /// User settings
    pub fn settings_file(&self) -> PathBuf {
        self.config.join("settings.json")
    }

    /// Log file for the interactive timer
    pub fn log_file(&self) -> PathBuf {
        self.data.join("pomodoro.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_root() {
        let paths = Paths::under(Path::new("/tmp/tomato-test"));
        assert_eq!(paths.session_file(), PathBuf::from("/tmp/tomato-test/data/session.json"));
        assert_eq!(
            paths.settings_file(),
            PathBuf::from("/tmp/tomato-test/config/settings.json")
        );
        assert_eq!(paths.log_file(), PathBuf::from("/tmp/tomato-test/data/pomodoro.log"));
    }
}
