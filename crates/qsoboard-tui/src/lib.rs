//! Full-screen kiosk dashboard for qsoboard.

pub mod artifact;
pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod terminal;
pub mod ticker;
pub mod update;

use std::io::{IsTerminal, stdout};
use std::time::Instant;

use anyhow::Result;
pub use artifact::TerminalRenderer;
use qsoboard_core::aggregator::Aggregator;
use qsoboard_core::config::Config;
use qsoboard_core::slots::TitleCard;
use qsoboard_core::snapshot::{self, Snapshot};
use qsoboard_core::store::EventStore;
use qsoboard_core::worker::RefreshWorker;
pub use runtime::DashboardRuntime;
use tokio::runtime::Handle;
use tracing::info;

use crate::scheduler::Scheduler;
use crate::state::DashboardState;

/// Logo slot content: the event name and its UTC window.
pub fn title_card(config: &Config) -> TitleCard {
    let format = "%a %d %b %Y %H:%M UTC";
    TitleCard {
        title: config.event_name.clone(),
        lines: vec![
            format!("Starts {}", config.event_start.format(format)),
            format!("Ends   {}", config.event_end.format(format)),
        ],
    }
}

/// Runs the dashboard until the operator quits.
///
/// The refresh worker is spawned on the current tokio runtime, which must be
/// multi-threaded: the display loop blocks this task while it runs.
pub async fn run_dashboard<S>(config: &Config, store: S) -> Result<()>
where
    S: EventStore + Send + 'static,
{
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The dashboard requires a terminal.\n\
             Use `qsoboard report` for a one-shot summary."
        );
    }

    let modes = config.mode_table()?;
    let window = config.contest_window();
    let (writer, reader) = snapshot::channel(Snapshot::default());
    let renderer = TerminalRenderer::new(Some(window.clone()));
    let aggregator = Aggregator::new(
        store,
        renderer,
        writer,
        config.aggregation.clone(),
        modes,
        title_card(config),
    );

    terminal::install_panic_hook();
    let terminal = terminal::setup_terminal()?;

    let worker = RefreshWorker::spawn(&Handle::current(), aggregator);
    let state = DashboardState::new(window, reader, config.ticker.step);
    let scheduler = Scheduler::new(&config.timing, Instant::now());
    info!(event = %config.event_name, "dashboard started");

    let mut runtime = DashboardRuntime::new(
        terminal,
        state,
        scheduler,
        worker,
        config.timing.shutdown_timeout(),
    );
    runtime.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_card_lists_event_window() {
        let card = title_card(&Config::default());
        assert_eq!(card.title, "Field Day");
        assert_eq!(
            card.lines,
            vec![
                "Starts Sat 27 Jun 2026 18:00 UTC".to_string(),
                "Ends   Sun 28 Jun 2026 21:00 UTC".to_string(),
            ]
        );
    }
}
