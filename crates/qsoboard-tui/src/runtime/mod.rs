//! Dashboard runtime: owns the terminal, the scheduler and the worker handle.
//!
//! The loop waits on terminal input until the next timer deadline, feeds
//! every event through the reducer, executes the effects and redraws when the
//! state asks for it.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event;
use qsoboard_core::worker::RefreshWorker;
use tracing::info;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::scheduler::Scheduler;
use crate::state::DashboardState;
use crate::terminal::{self, DashboardTerminal};
use crate::{render, update};

pub struct DashboardRuntime {
    terminal: DashboardTerminal,
    pub state: DashboardState,
    scheduler: Scheduler,
    worker: Option<RefreshWorker>,
    shutdown_timeout: Duration,
}

impl DashboardRuntime {
    pub fn new(
        terminal: DashboardTerminal,
        state: DashboardState,
        scheduler: Scheduler,
        worker: RefreshWorker,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            terminal,
            state,
            scheduler,
            worker: Some(worker),
            shutdown_timeout,
        }
    }

    /// Runs the main event loop until a quit key, then stops the worker.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        self.stop_worker();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Size first so timers and keys see the current layout.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if self.state.needs_redraw {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                self.state.needs_redraw = false;
            }
        }
        Ok(())
    }

    /// Terminal input received before the next deadline, then due timers.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let poll_duration = self.scheduler.until_next(Instant::now());
        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        events.extend(
            self.scheduler
                .due(Instant::now())
                .into_iter()
                .map(UiEvent::Timer),
        );
        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::RequestRefresh { size } => {
                if let Some(worker) = &self.worker {
                    worker.request_refresh(size);
                }
            }
            UiEffect::ResetTimer(kind) => {
                self.scheduler.reset(kind, Instant::now());
            }
        }
    }

    /// Signals the worker and waits up to the configured timeout.
    fn stop_worker(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        info!("stopping refresh worker");
        worker.shutdown(self.shutdown_timeout);
    }
}

impl Drop for DashboardRuntime {
    fn drop(&mut self) {
        self.stop_worker();
        let _ = terminal::restore_terminal();
    }
}
