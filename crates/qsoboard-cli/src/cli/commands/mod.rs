//! CLI command handlers.

pub mod config;
pub mod db;
pub mod report;
pub mod run;
