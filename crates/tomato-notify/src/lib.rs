//! tomato-notify - Desktop notifications for Tomato Pomodoro
//!
//! Delivery is best-effort: a notification that cannot be shown is logged and
//! dropped, never surfaced to the caller. Works on macOS
//! (osascript/terminal-notifier), Linux (notify-send/kdialog), and WSL.

mod backend;

pub use backend::{Backend, Notification};

use std::cell::RefCell;

/// Default notification title
pub const DEFAULT_TITLE: &str = "Tomato Pomodoro";

/// Auto-dismiss delay for backends that support one
const DISMISS_AFTER_SECS: u32 = 10;

/// Something that can put an alert in front of the user
pub trait Notifier {
    /// Deliver an alert. Implementations must not panic or report failure.
    fn notify(&self, title: &str, body: &str, with_sound: bool);
}

/// Notifier backed by the platform's notification command
pub struct DesktopNotifier {
    backend: Backend,
    echo: bool,
}

impl DesktopNotifier {
    /// Detect the backend and also echo every alert to the terminal
    pub fn new() -> Self {
        Self {
            backend: Backend::detect(),
            echo: true,
        }
    }

    /// Detect the backend without terminal echo (full-screen mode)
    pub fn quiet() -> Self {
        Self {
            backend: Backend::detect(),
            echo: false,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str, with_sound: bool) {
        let mut notification = Notification::new(body)
            .with_title(title)
            .with_timeout(DISMISS_AFTER_SECS);
        if !with_sound {
            notification = notification.silent();
        }

        if self.echo {
            // The echo backend already prints; don't print twice
            if self.backend != Backend::Echo {
                println!();
                println!("[{}] {}", title, body);
                println!();
            }
        } else if self.backend == Backend::Echo {
            tracing::debug!("no desktop notifier available, dropping \"{}\"", title);
            return;
        }

        if let Err(e) = self.backend.send(&notification) {
            tracing::warn!("Failed to send notification via {}: {:#}", self.backend.name(), e);
        }
    }
}

/// Discards every alert
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str, _with_sound: bool) {}
}

/// Keeps every alert in memory, for tests and previews
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts delivered so far, oldest first
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str, with_sound: bool) {
        let mut notification = Notification::new(body).with_title(title);
        notification.sound = with_sound;
        self.sent.borrow_mut().push(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::rc::Rc<N> {
    fn notify(&self, title: &str, body: &str, with_sound: bool) {
        (**self).notify(title, body, with_sound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify("First", "one", true);
        notifier.notify("Second", "two", false);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].title, "First");
        assert_eq!(sent[0].message, "one");
        assert!(sent[0].sound);
        assert_eq!(sent[1].title, "Second");
        assert!(!sent[1].sound);
    }

    #[test]
    fn test_quiet_echo_backend_is_silent() {
        let notifier = DesktopNotifier {
            backend: Backend::Echo,
            echo: false,
        };
        // Must return without printing or failing
        notifier.notify("Work Session Complete!", "Time for a break!", true);
    }
}
