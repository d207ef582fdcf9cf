//! Core of the qsoboard kiosk: contact store access, aggregation, and the
//! snapshot handoff between the refresh worker and the display.

pub mod aggregate;
pub mod aggregator;
pub mod config;
pub mod contest;
pub mod logging;
pub mod model;
pub mod render;
pub mod slots;
pub mod snapshot;
pub mod store;
pub mod worker;
