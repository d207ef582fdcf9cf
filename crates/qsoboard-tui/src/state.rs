//! Dashboard state owned by the runtime and mutated only by the reducer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use qsoboard_core::contest::ContestWindow;
use qsoboard_core::render::DisplaySize;
use qsoboard_core::slots::SlotId;
use qsoboard_core::snapshot::SnapshotReader;
use ratatui::buffer::Buffer;

use crate::ticker::{Ticker, TickerMessages};

pub struct DashboardState {
    /// Rotation position; always below [`SlotId::COUNT`].
    pub index: usize,
    /// Artifact currently on screen. Kept until a rotation finds a newer one.
    pub shown: Option<Arc<Buffer>>,
    pub messages: TickerMessages,
    pub ticker: Ticker,
    pub width: u16,
    pub height: u16,
    pub should_quit: bool,
    pub needs_redraw: bool,
    pub window: ContestWindow,
    pub snapshot: SnapshotReader<Buffer>,
    pub clock: fn() -> DateTime<Utc>,
}

impl DashboardState {
    pub fn new(window: ContestWindow, snapshot: SnapshotReader<Buffer>, ticker_step: u16) -> Self {
        Self {
            index: 0,
            shown: None,
            messages: TickerMessages::default(),
            ticker: Ticker::new(ticker_step),
            width: 0,
            height: 0,
            should_quit: false,
            needs_redraw: true,
            window,
            snapshot,
            clock: Utc::now,
        }
    }

    pub fn current_slot(&self) -> SlotId {
        SlotId::from_index(self.index)
    }

    /// Area available to artifacts: everything above the ticker row.
    pub fn artifact_size(&self) -> DisplaySize {
        DisplaySize::new(self.width, self.height.saturating_sub(1))
    }
}
