//! Events fed to the reducer.

use crossterm::event::Event;

use crate::scheduler::TimerKind;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Current terminal size, sent once per loop iteration before other events.
    Frame { width: u16, height: u16 },
    Terminal(Event),
    Timer(TimerKind),
}
