//! Formatting utilities

use chrono::{DateTime, Local};

const FILLED: &str = "\u{2588}";
const EMPTY: &str = "\u{2591}";

/// Format a countdown as MM:SS (minutes are not wrapped into hours)
pub fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format a timestamp as HH:MM:SS
pub fn time(dt: DateTime<Local>) -> String {
    dt.format("%H:%M:%S").to_string()
}

/// Percentage of `total` already elapsed, rounded; 0 when `total` is 0
pub fn progress_percent(remaining: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let elapsed = total.saturating_sub(remaining);
    let percent = (elapsed as f64 * 100.0 / total as f64).round() as u32;
    percent.min(100)
}

/// A bar of `length` glyphs, filled in proportion to the elapsed percentage
pub fn progress_bar(remaining: u64, total: u64, length: usize) -> String {
    let percent = progress_percent(remaining, total) as usize;
    let filled = (length * percent) / 100;
    let empty = length - filled;
    format!("{}{}", FILLED.repeat(filled), EMPTY.repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(65), "01:05");
        assert_eq!(clock(1500), "25:00");
        assert_eq!(clock(100 * 60), "100:00");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(750, 1500), 50);
        assert_eq!(progress_percent(1500, 1500), 0);
        assert_eq!(progress_percent(0, 1500), 100);
        assert_eq!(progress_percent(10, 0), 0);
        // 1/3 elapsed rounds to 33, 2/3 rounds to 67
        assert_eq!(progress_percent(200, 300), 33);
        assert_eq!(progress_percent(100, 300), 67);
    }

    #[test]
    fn test_progress_bar() {
        let bar = progress_bar(750, 1500, 10);
        assert_eq!(bar, format!("{}{}", FILLED.repeat(5), EMPTY.repeat(5)));
        assert_eq!(bar.chars().count(), 10);

        assert_eq!(progress_bar(1500, 1500, 4), EMPTY.repeat(4));
        assert_eq!(progress_bar(0, 1500, 4), FILLED.repeat(4));
        assert_eq!(progress_bar(0, 0, 3), EMPTY.repeat(3));
    }
}
