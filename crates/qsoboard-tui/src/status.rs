//! Ticker status text: event name, UTC clock, countdown and last QSO.

use chrono::{DateTime, Utc};
use qsoboard_core::contest::{ContestPhase, ContestWindow};
use ratatui::style::Color;

use crate::ticker::{TickerMessages, slot};

fn countdown_color(phase: &ContestPhase) -> Color {
    match phase {
        ContestPhase::NotStarted(_) => Color::Green,
        ContestPhase::Running(_) => Color::Yellow,
        ContestPhase::Over => Color::Red,
    }
}

/// Rewrites the fixed status slots for `now`.
///
/// The last-QSO slot is only touched once a banner exists, so it keeps its
/// last value if the snapshot briefly has none.
pub fn refresh_status(
    messages: &mut TickerMessages,
    window: &ContestWindow,
    now: DateTime<Utc>,
    banner: Option<&str>,
) {
    messages.set_message(slot::TITLE, window.name.as_str());
    messages.set_colors(slot::TITLE, Color::Blue, Color::Black);

    messages.set_message(slot::CLOCK, now.format("%H:%M:%S UTC").to_string());

    let phase = window.phase(now);
    messages.set_message(slot::COUNTDOWN, phase.message());
    messages.set_colors(slot::COUNTDOWN, countdown_color(&phase), Color::Black);

    if let Some(banner) = banner {
        messages.set_message(slot::LAST_QSO, banner);
        messages.set_colors(slot::LAST_QSO, Color::Cyan, Color::Black);
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

    fn text(messages: &TickerMessages, index: usize) -> &str {
        &messages.get(index).unwrap().text
    }

    #[test]
    fn test_status_before_start() {
        let mut messages = TickerMessages::default();
        let now = Utc.with_ymd_and_hms(2026, 6, 27, 17, 0, 0).unwrap();
        refresh_status(&mut messages, &window(), now, None);

        assert_eq!(text(&messages, slot::TITLE), "Field Day");
        assert_eq!(text(&messages, slot::CLOCK), "17:00:00 UTC");
        assert_eq!(
            text(&messages, slot::COUNTDOWN),
            "The contest starts in 01:00:00"
        );
        assert_eq!(messages.get(slot::COUNTDOWN).unwrap().fg, Color::Green);
        assert_eq!(text(&messages, slot::LAST_QSO), "");
    }

    #[test]
    fn test_status_colors_follow_phase() {
        let mut messages = TickerMessages::default();
        let running = Utc.with_ymd_and_hms(2026, 6, 28, 12, 0, 0).unwrap();
        refresh_status(&mut messages, &window(), running, None);
        assert_eq!(messages.get(slot::COUNTDOWN).unwrap().fg, Color::Yellow);

        let over = Utc.with_ymd_and_hms(2026, 6, 29, 0, 0, 0).unwrap();
        refresh_status(&mut messages, &window(), over, None);
        assert_eq!(text(&messages, slot::COUNTDOWN), "The contest is over.");
        assert_eq!(messages.get(slot::COUNTDOWN).unwrap().fg, Color::Red);
    }

    #[test]
    fn test_banner_kept_when_missing() {
        let mut messages = TickerMessages::default();
        let now = Utc.with_ymd_and_hms(2026, 6, 28, 12, 0, 0).unwrap();
        refresh_status(&mut messages, &window(), now, Some("Last QSO: W1AW"));
        refresh_status(&mut messages, &window(), now, None);
        assert_eq!(text(&messages, slot::LAST_QSO), "Last QSO: W1AW");
        assert_eq!(messages.get(slot::LAST_QSO).unwrap().fg, Color::Cyan);
    }
}
