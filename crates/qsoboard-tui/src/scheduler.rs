//! Independent periodic timers driving the display loop.
//!
//! Each timer keeps its own deadline. A late loop fires a due timer once and
//! schedules the next deadline a full period after now; missed periods are not
//! replayed.

use std::time::{Duration, Instant};

use enum_map::{Enum, EnumMap};
use qsoboard_core::config::TimingConfig;

/// Period of the clock / countdown refresh.
pub const STATUS_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum TimerKind {
    /// Ticker step and redraw.
    Render,
    /// Clock, countdown and last-QSO text.
    Status,
    /// Advance to the next view.
    Rotation,
    /// Ask the worker for new data.
    Refresh,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    periods: EnumMap<TimerKind, Duration>,
    deadlines: EnumMap<TimerKind, Instant>,
}

impl Scheduler {
    /// Status and refresh fire immediately; the others after one period.
    pub fn new(timing: &TimingConfig, now: Instant) -> Self {
        let periods = EnumMap::from_fn(|kind| match kind {
            TimerKind::Render => timing.tick(),
            TimerKind::Status => STATUS_PERIOD,
            TimerKind::Rotation => timing.dwell(),
            TimerKind::Refresh => timing.data_refresh(),
        });
        let deadlines = EnumMap::from_fn(|kind| match kind {
            TimerKind::Status | TimerKind::Refresh => now,
            TimerKind::Render | TimerKind::Rotation => now + periods[kind],
        });
        Self { periods, deadlines }
    }

    /// Timers due at `now`, in declaration order. Each is rescheduled.
    pub fn due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        for (kind, deadline) in &mut self.deadlines {
            if *deadline > now {
                continue;
            }
            let period = self.periods[kind];
            *deadline += period;
            if *deadline <= now {
                *deadline = now + period;
            }
            fired.push(kind);
        }
        fired
    }

    /// Restarts `kind` so it next fires one full period after `now`.
    pub fn reset(&mut self, kind: TimerKind, now: Instant) {
        self.deadlines[kind] = now + self.periods[kind];
    }

    /// Time until the earliest deadline (zero if one is already due).
    pub fn until_next(&self, now: Instant) -> Duration {
        self.deadlines
            .values()
            .map(|deadline| deadline.saturating_duration_since(now))
            .min()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingConfig {
        TimingConfig {
            tick_ms: 20,
            display_dwell_secs: 10,
            data_refresh_secs: 60,
            shutdown_timeout_secs: 1,
        }
    }

    #[test]
    fn test_status_and_refresh_fire_immediately() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(&timing(), start);
        assert_eq!(
            scheduler.due(start),
            vec![TimerKind::Status, TimerKind::Refresh]
        );
        assert!(scheduler.due(start).is_empty());
        assert_eq!(scheduler.until_next(start), Duration::from_millis(20));
    }

    #[test]
    fn test_timers_fire_on_their_own_periods() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(&timing(), start);
        scheduler.due(start);

        let fired = scheduler.due(start + Duration::from_secs(10));
        assert_eq!(
            fired,
            vec![TimerKind::Render, TimerKind::Status, TimerKind::Rotation]
        );
        let fired = scheduler.due(start + Duration::from_secs(60));
        assert!(fired.contains(&TimerKind::Refresh));
    }

    #[test]
    fn test_late_loop_does_not_burst() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(&timing(), start);
        scheduler.due(start);

        let late = start + Duration::from_secs(5);
        let fired = scheduler.due(late);
        assert_eq!(fired.iter().filter(|k| **k == TimerKind::Render).count(), 1);
        // Next render is one period after the late firing, not a backlog.
        assert_eq!(scheduler.until_next(late), Duration::from_millis(20));
    }

    #[test]
    fn test_reset_restarts_period() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(&timing(), start);
        scheduler.due(start);

        let later = start + Duration::from_secs(9);
        scheduler.reset(TimerKind::Rotation, later);
        let fired = scheduler.due(start + Duration::from_secs(10));
        assert!(!fired.contains(&TimerKind::Rotation));
        let fired = scheduler.due(later + Duration::from_secs(10));
        assert!(fired.contains(&TimerKind::Rotation));
    }
}
