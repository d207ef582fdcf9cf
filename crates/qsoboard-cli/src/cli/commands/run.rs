//! Full-screen dashboard command.

use anyhow::Result;
use qsoboard_core::config::Config;
use qsoboard_core::logging;
use qsoboard_core::store::SqliteEventStore;
use tracing::info;

pub async fn run(config: &Config) -> Result<()> {
    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::init_file_logging(&config.logging)?;
    info!(database = %config.database.display(), "opening contact log");
    let store = SqliteEventStore::open(&config.database);
    qsoboard_tui::run_dashboard(config, store).await
}
