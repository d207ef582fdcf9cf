//! Configuration management for qsoboard.
//!
//! Loads configuration from `qsoboard.toml` (or the path given on the command
//! line) with sensible defaults. The file is read once at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::contest::ContestWindow;
use crate::model::{Band, DEFAULT_MODES, ModeClass, ModeTable};

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Loop periods of the display and the refresh worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Display tick; one ticker step per tick.
    pub tick_ms: u64,
    /// How long each view stays on screen.
    pub display_dwell_secs: u64,
    /// How often the worker checks the store for new contacts.
    pub data_refresh_secs: u64,
    /// Upper bound on waiting for an in-flight refresh at quit.
    pub shutdown_timeout_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            display_dwell_secs: 10,
            data_refresh_secs: 60,
            shutdown_timeout_secs: 60,
        }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_secs(self.display_dwell_secs)
    }

    pub fn data_refresh(&self) -> Duration {
        Duration::from_secs(self.data_refresh_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Window sizes used by the aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Trailing window for per-operator rates.
    pub rate_window_minutes: u32,
    /// Width of one bucket in the per-band rate chart.
    pub bucket_minutes: u32,
    /// Rows in the rates table.
    pub top_rates: usize,
    /// Rows in the operators table.
    pub top_operators: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            rate_window_minutes: 10,
            bucket_minutes: 15,
            top_rates: 10,
            top_operators: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Columns the crawl moves per display tick.
    pub step: u16,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self { step: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file written while the dashboard owns the terminal.
    pub file: PathBuf,
    /// Default filter when `QSOBOARD_LOG` is unset (e.g. `info`, `qsoboard_core=debug`).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("qsoboard.log"),
            level: "info".to_string(),
        }
    }
}

fn default_modes() -> BTreeMap<String, ModeClass> {
    DEFAULT_MODES
        .iter()
        .map(|(raw, class)| ((*raw).to_string(), *class))
        .collect()
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite contact log written by the logging program.
    pub database: PathBuf,

    /// Shown as the first ticker message.
    pub event_name: String,

    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,

    pub timing: TimingConfig,
    pub aggregation: AggregationConfig,
    pub ticker: TickerConfig,
    pub logging: LoggingConfig,

    /// Raw logged mode to mode class. A `[modes]` table replaces the built-in list.
    #[serde(default = "default_modes")]
    pub modes: BTreeMap<String, ModeClass>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(Self::DEFAULT_DATABASE),
            event_name: Self::DEFAULT_EVENT_NAME.to_string(),
            event_start: Utc.with_ymd_and_hms(2026, 6, 27, 18, 0, 0).single().unwrap_or_default(),
            event_end: Utc.with_ymd_and_hms(2026, 6, 28, 21, 0, 0).single().unwrap_or_default(),
            timing: TimingConfig::default(),
            aggregation: AggregationConfig::default(),
            ticker: TickerConfig::default(),
            logging: LoggingConfig::default(),
            modes: default_modes(),
        }
    }
}

impl Config {
    pub const DEFAULT_PATH: &str = "qsoboard.toml";
    const DEFAULT_DATABASE: &str = "n1mm_view.db";
    const DEFAULT_EVENT_NAME: &str = "Field Day";

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Checks values that would otherwise surface as a stalled or broken display.
    pub fn validate(&self) -> Result<()> {
        let timing = &self.timing;
        for (name, value) in [
            ("timing.tick_ms", timing.tick_ms),
            ("timing.display_dwell_secs", timing.display_dwell_secs),
            ("timing.data_refresh_secs", timing.data_refresh_secs),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }
        if self.aggregation.rate_window_minutes == 0 {
            bail!("aggregation.rate_window_minutes must be greater than zero");
        }
        if self.aggregation.bucket_minutes == 0 {
            bail!("aggregation.bucket_minutes must be greater than zero");
        }
        if self.ticker.step == 0 {
            bail!("ticker.step must be greater than zero");
        }
        if self.event_start > self.event_end {
            bail!(
                "event_start ({}) is after event_end ({})",
                self.event_start,
                self.event_end
            );
        }
        Band::validate_labels()?;
        self.mode_table()?;
        Ok(())
    }

    /// Builds the mode lookup from `[modes]`.
    pub fn mode_table(&self) -> Result<ModeTable> {
        ModeTable::new(self.modes.iter().map(|(raw, class)| (raw.as_str(), *class)))
            .context("Invalid [modes] table")
    }

    pub fn contest_window(&self) -> ContestWindow {
        ContestWindow {
            name: self.event_name.clone(),
            start: self.event_start,
            end: self.event_end,
        }
    }
}
