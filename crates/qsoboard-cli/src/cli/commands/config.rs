//! Config command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use qsoboard_core::config::Config;

pub fn path(path: &Path) {
    println!("{}", path.display());
}

pub fn init(path: &Path) -> Result<()> {
    Config::init(path).with_context(|| format!("init config at {}", path.display()))?;
    println!("Created config at {}", path.display());
    Ok(())
}
