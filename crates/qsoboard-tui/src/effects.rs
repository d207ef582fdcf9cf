//! Commands the reducer hands back to the runtime.
//!
//! Worker requests and timer resets happen only in the runtime.

use qsoboard_core::render::DisplaySize;

use crate::scheduler::TimerKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the dashboard.
    Quit,

    /// Ask the refresh worker for a cycle rendered at `size`.
    RequestRefresh { size: DisplaySize },

    /// Restart a timer's period from now.
    ResetTimer(TimerKind),
}
