use ratatui::style::{Color, Style};
use tracing::debug;

/// Number of ticker message slots.
pub const TICKER_SLOTS: usize = 10;

/// Fixed slot roles. Slots past these are free for other status text.
pub mod slot {
    pub const TITLE: usize = 0;
    pub const CLOCK: usize = 1;
    pub const COUNTDOWN: usize = 2;
    pub const LAST_QSO: usize = 3;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerMessage {
    pub text: String,
    pub fg: Color,
    pub bg: Color,
}

impl Default for TickerMessage {
    fn default() -> Self {
        Self {
            text: String::new(),
            fg: Color::Green,
            bg: Color::Black,
        }
    }
}

impl TickerMessage {
    pub fn style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }
}

/// The ticker's message slots. Written by the status refresh, read when a
/// strip is enqueued.
#[derive(Debug, Clone, Default)]
pub struct TickerMessages {
    slots: [TickerMessage; TICKER_SLOTS],
}

impl TickerMessages {
    /// Sets a slot's text. Out-of-range indexes are ignored.
    pub fn set_message(&mut self, index: usize, text: impl Into<String>) {
        match self.slots.get_mut(index) {
            Some(message) => message.text = text.into(),
            None => debug!(index, "ignoring ticker message for unknown slot"),
        }
    }

    /// Sets a slot's colors. Out-of-range indexes are ignored.
    pub fn set_colors(&mut self, index: usize, fg: Color, bg: Color) {
        match self.slots.get_mut(index) {
            Some(message) => {
                message.fg = fg;
                message.bg = bg;
            }
            None => debug!(index, "ignoring ticker colors for unknown slot"),
        }
    }

    pub fn get(&self, index: usize) -> Option<&TickerMessage> {
        self.slots.get(index)
    }

    pub fn first_non_empty(&self) -> Option<usize> {
        self.slots.iter().position(|m| !m.text.is_empty())
    }

    /// Next non-empty slot after `index`, wrapping. One full lap ends back at
    /// `index` itself; `None` when every slot is empty.
    pub fn next_non_empty(&self, index: usize) -> Option<usize> {
        (1..=TICKER_SLOTS)
            .map(|offset| (index + offset) % TICKER_SLOTS)
            .find(|i| !self.slots[*i].text.is_empty())
    }
}
