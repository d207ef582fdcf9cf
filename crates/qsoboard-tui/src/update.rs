//! Dashboard reducer.
//!
//! The runtime calls `update(state, event)` and executes the returned effects.
//! Nothing here touches the terminal, the worker or the clock's timers.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use qsoboard_core::render::DisplaySize;
use qsoboard_core::slots::SlotId;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::scheduler::TimerKind;
use crate::state::DashboardState;
use crate::status;

/// The main reducer function.
pub fn update(state: &mut DashboardState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Frame { width, height } => handle_frame(state, width, height),
        UiEvent::Timer(kind) => handle_timer(state, kind),
        UiEvent::Terminal(event) => handle_terminal_event(state, event),
    }
}

/// A size change asks for artifacts at the new size.
fn handle_frame(state: &mut DashboardState, width: u16, height: u16) -> Vec<UiEffect> {
    if state.width == width && state.height == height {
        return vec![];
    }
    state.width = width;
    state.height = height;
    state.needs_redraw = true;
    vec![UiEffect::RequestRefresh {
        size: state.artifact_size(),
    }]
}

fn handle_timer(state: &mut DashboardState, kind: TimerKind) -> Vec<UiEffect> {
    match kind {
        TimerKind::Render => {
            state.ticker.advance(&state.messages, state.width);
            if state.shown.is_none() {
                state.shown = state.snapshot.read(state.current_slot());
            }
            state.needs_redraw = true;
            vec![]
        }
        TimerKind::Status => {
            let snapshot = state.snapshot.load();
            status::refresh_status(
                &mut state.messages,
                &state.window,
                (state.clock)(),
                snapshot.banner.as_deref(),
            );
            stale_size_refresh(state, snapshot.size)
        }
        TimerKind::Rotation => {
            rotate(state, true);
            vec![]
        }
        TimerKind::Refresh => vec![UiEffect::RequestRefresh {
            size: state.artifact_size(),
        }],
    }
}

/// Asks again when the published artifacts were rendered for another area.
/// The worker skips requests while a cycle runs, so a resize can be lost.
fn stale_size_refresh(state: &DashboardState, rendered: Option<DisplaySize>) -> Vec<UiEffect> {
    let wanted = state.artifact_size();
    match rendered {
        Some(rendered) if rendered != wanted && !wanted.is_empty() => {
            vec![UiEffect::RequestRefresh { size: wanted }]
        }
        _ => vec![],
    }
}

/// Moves one slot forward or back. The shown artifact only changes when the
/// new slot has one, so an empty slot never blanks the screen.
fn rotate(state: &mut DashboardState, forward: bool) {
    state.index = if forward {
        (state.index + 1) % SlotId::COUNT
    } else {
        (state.index + SlotId::COUNT - 1) % SlotId::COUNT
    };
    if let Some(artifact) = state.snapshot.read(state.current_slot()) {
        state.shown = Some(artifact);
        state.needs_redraw = true;
    }
}

fn handle_terminal_event(state: &mut DashboardState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(state, key),
        Event::Resize(..) => {
            state.needs_redraw = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut DashboardState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => quit(state),
        KeyCode::Char('q') | KeyCode::Esc => quit(state),
        KeyCode::Char('n' | ' ') | KeyCode::Right => {
            rotate(state, true);
            vec![UiEffect::ResetTimer(TimerKind::Rotation)]
        }
        KeyCode::Char('p') | KeyCode::Left => {
            rotate(state, false);
            vec![UiEffect::ResetTimer(TimerKind::Rotation)]
        }
        KeyCode::Char('r') => vec![UiEffect::RequestRefresh {
            size: state.artifact_size(),
        }],
        _ => vec![],
    }
}

fn quit(state: &mut DashboardState) -> Vec<UiEffect> {
    state.should_quit = true;
    vec![UiEffect::Quit]
}
