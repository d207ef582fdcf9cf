//! Database command handlers.

use anyhow::{Context, Result};
use qsoboard_core::config::Config;
use qsoboard_core::logging;
use qsoboard_core::store::SqliteEventStore;
use tracing::info;

/// Creates the contact log schema. Existing tables and rows are left alone.
pub fn init(config: &Config) -> Result<()> {
    logging::init_stderr_logging(&config.logging)?;
    let store = SqliteEventStore::create(&config.database)
        .with_context(|| format!("init database at {}", config.database.display()))?;
    info!(path = %store.path().display(), "contact log schema ready");
    println!("Database ready at {}", store.path().display());
    Ok(())
}
