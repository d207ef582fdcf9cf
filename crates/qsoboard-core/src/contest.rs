//! Contest window and the countdown text shown on the ticker.

use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestWindow {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Where `now` falls relative to the contest, with the time left until the
/// next boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestPhase {
    NotStarted(TimeDelta),
    Running(TimeDelta),
    Over,
}

impl ContestWindow {
    pub fn phase(&self, now: DateTime<Utc>) -> ContestPhase {
        if now < self.start {
            ContestPhase::NotStarted(self.start - now)
        } else if now < self.end {
            ContestPhase::Running(self.end - now)
        } else {
            ContestPhase::Over
        }
    }
}

impl ContestPhase {
    pub fn message(&self) -> String {
        match self {
            ContestPhase::NotStarted(left) => {
                format!("The contest starts in {}", format_remaining(*left))
            }
            ContestPhase::Running(left) => {
                format!("The contest ends in {}", format_remaining(*left))
            }
            ContestPhase::Over => "The contest is over.".to_string(),
        }
    }
}

/// `D days, HH:MM:SS`, or `HH:MM:SS` under a day. Sub-second parts are dropped.
pub fn format_remaining(delta: TimeDelta) -> String {
    let total = delta.num_seconds().max(0);
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;
    if days == 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{days} days, {hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn window() -> ContestWindow {
        ContestWindow {
            name: "Field Day".to_string(),
            start: Utc.with_ymd_and_hms(2026, 6, 27, 18, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 6, 28, 21, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(TimeDelta::seconds(59)), "00:00:59");
        assert_eq!(format_remaining(TimeDelta::seconds(3_661)), "01:01:01");
        assert_eq!(
            format_remaining(TimeDelta::seconds(2 * 86_400 + 5)),
            "2 days, 00:00:05"
        );
        assert_eq!(format_remaining(TimeDelta::milliseconds(1_999)), "00:00:01");
    }

    #[test]
    fn test_phase_messages() {
        let window = window();
        let before = Utc.with_ymd_and_hms(2026, 6, 27, 17, 0, 0).unwrap();
        assert_eq!(
            window.phase(before).message(),
            "The contest starts in 01:00:00"
        );

        let during = Utc.with_ymd_and_hms(2026, 6, 27, 20, 30, 0).unwrap();
        assert_eq!(
            window.phase(during).message(),
            "The contest ends in 1 days, 00:30:00"
        );

        assert_eq!(window.phase(window.end).message(), "The contest is over.");
        assert!(matches!(window.phase(window.start), ContestPhase::Running(_)));
    }
}
