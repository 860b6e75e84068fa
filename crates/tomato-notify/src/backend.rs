//! Notification backends for different platforms

use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};

/// Sound played with audible notifications on macOS
const MAC_SOUND: &str = "Glass";

/// A notification to display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    /// Notification title
    pub title: String,
    /// Notification message/body
    pub message: String,
    /// Auto-dismiss timeout in seconds (optional)
    pub timeout: Option<u32>,
    /// Whether to play a sound
    pub sound: bool,
}

impl Notification {
    /// Create a new notification with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: crate::DEFAULT_TITLE.to_string(),
            message: message.into(),
            sound: true,
            ..Default::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Disable sound
    pub fn silent(mut self) -> Self {
        self.sound = false;
        self
    }
}

/// Available notification backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS terminal-notifier
    TerminalNotifier,
    /// macOS osascript
    Osascript,
    /// Linux notify-send
    NotifySend,
    /// KDE kdialog
    Kdialog,
    /// WSL PowerShell
    Wsl,
    /// Fallback echo
    Echo,
}

impl Backend {
    /// Detect the best available backend for the current platform
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            if Self::command_exists("terminal-notifier") {
                return Self::TerminalNotifier;
            }
            return Self::Osascript;
        }

        #[cfg(target_os = "linux")]
        {
            if std::env::var("WSL_DISTRO_NAME").is_ok() {
                return Self::Wsl;
            }
            if Self::command_exists("notify-send") {
                return Self::NotifySend;
            }
            if Self::command_exists("kdialog") {
                return Self::Kdialog;
            }
            return Self::Echo;
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            Self::Echo
        }
    }

    /// Check if a command exists
    fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Get the name of this backend
    pub fn name(&self) -> &'static str {
        match self {
            Self::TerminalNotifier => "terminal-notifier",
            Self::Osascript => "osascript",
            Self::NotifySend => "notify-send",
            Self::Kdialog => "kdialog",
            Self::Wsl => "wsl",
            Self::Echo => "echo",
        }
    }

    /// Send a notification using this backend
    pub fn send(&self, notification: &Notification) -> Result<()> {
        match self {
            Self::TerminalNotifier => self.send_terminal_notifier(notification),
            Self::Osascript => self.send_osascript(notification),
            Self::NotifySend => self.send_notify_send(notification),
            Self::Kdialog => self.send_kdialog(notification),
            Self::Wsl => self.send_wsl(notification),
            Self::Echo => self.send_echo(notification),
        }
    }

    fn run(&self, cmd: &mut Command) -> Result<()> {
        let status = cmd
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to launch {}", self.name()))?;
        if !status.success() {
            bail!("{} failed with status: {}", self.name(), status);
        }
        Ok(())
    }

    fn send_terminal_notifier(&self, notification: &Notification) -> Result<()> {
        let mut cmd = Command::new("terminal-notifier");
        cmd.args([
            "-title",
            &notification.title,
            "-message",
            &notification.message,
            "-group",
            "tomato",
        ]);

        if notification.sound {
            cmd.args(["-sound", MAC_SOUND]);
        }

        self.run(&mut cmd)
    }

    fn send_osascript(&self, notification: &Notification) -> Result<()> {
        let mut script = format!(
            r#"display notification "{}" with title "{}""#,
            escape_applescript(&notification.message),
            escape_applescript(&notification.title)
        );

        if notification.sound {
            script.push_str(&format!(r#" sound name "{}""#, MAC_SOUND));
        }

        self.run(Command::new("osascript").args(["-e", &script]))
    }

    fn send_notify_send(&self, notification: &Notification) -> Result<()> {
        let mut cmd = Command::new("notify-send");
        cmd.args(["--app-name", crate::DEFAULT_TITLE]);

        if let Some(timeout) = notification.timeout {
            cmd.args(["--expire-time", &(timeout * 1000).to_string()]);
        }

        cmd.args([&notification.title, &notification.message]);
        self.run(&mut cmd)
    }

    fn send_kdialog(&self, notification: &Notification) -> Result<()> {
        let timeout = notification.timeout.unwrap_or(5);

        self.run(Command::new("kdialog").args([
            "--passivepopup",
            &notification.message,
            &timeout.to_string(),
            "--title",
            &notification.title,
        ]))
    }

    fn send_wsl(&self, notification: &Notification) -> Result<()> {
        // Escape single quotes for PowerShell
        let title = notification.title.replace('\'', "''");
        let message = notification.message.replace('\'', "''");

        let ps_script = format!(
            r#"[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null; $template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); $template.GetElementsByTagName('text')[0].AppendChild($template.CreateTextNode('{}')) | Out-Null; $template.GetElementsByTagName('text')[1].AppendChild($template.CreateTextNode('{}')) | Out-Null; [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('{}').Show([Windows.UI.Notifications.ToastNotification]::new($template))"#,
            title,
            message,
            crate::DEFAULT_TITLE
        );

        self.run(Command::new("powershell.exe").args(["-Command", &ps_script]))
    }

    fn send_echo(&self, notification: &Notification) -> Result<()> {
        println!("[{}] {}", notification.title, notification.message);
        Ok(())
    }
}

/// Escape for an AppleScript string literal
fn escape_applescript(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', r#"\""#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_builder() {
        let n = Notification::new("Break's over!")
            .with_title("Short Break Complete!")
            .with_timeout(10)
            .silent();
        assert_eq!(n.title, "Short Break Complete!");
        assert_eq!(n.message, "Break's over!");
        assert_eq!(n.timeout, Some(10));
        assert!(!n.sound);
    }

    #[test]
    fn test_default_title_and_sound() {
        let n = Notification::new("hello");
        assert_eq!(n.title, crate::DEFAULT_TITLE);
        assert!(n.sound);
    }

    #[test]
    fn test_escape_applescript() {
        assert_eq!(escape_applescript(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_applescript(r"a\b"), r"a\\b");
        assert_eq!(escape_applescript("Break's over"), "Break's over");
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(Backend::NotifySend.name(), "notify-send");
        assert_eq!(Backend::Echo.name(), "echo");
    }
}
