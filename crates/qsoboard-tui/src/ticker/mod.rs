//! Continuous right-to-left crawl on the bottom row.
//!
//! Messages are rendered into strips when they are enqueued and recycled
//! round-robin, so the row is always filled edge to edge while any message is
//! non-empty. Positions are in columns and may be negative (off the left edge).

mod messages;

use std::collections::VecDeque;

pub use messages::{TICKER_SLOTS, TickerMessage, TickerMessages, slot};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;

/// Columns one char occupies when drawn on its own. Strip widths are summed
/// from this so the crawl bookkeeping matches the cells `render` writes.
fn char_columns(ch: char) -> i32 {
    ch.width().unwrap_or(0) as i32
}

#[derive(Debug, Clone)]
struct Strip {
    text: String,
    style: Style,
    width: i32,
}

impl Strip {
    fn from_message(message: &TickerMessage) -> Self {
        let text = format!(" {} ", message.text);
        let width = text.chars().map(char_columns).sum();
        Self {
            text,
            style: message.style(),
            width,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ticker {
    strips: VecDeque<Strip>,
    /// Left edge of the oldest strip.
    first_x: i32,
    /// Slot of the most recently enqueued message.
    cursor: usize,
    step: i32,
    total_width: i32,
}

impl Ticker {
    pub fn new(step: u16) -> Self {
        Self {
            strips: VecDeque::new(),
            first_x: 0,
            cursor: 0,
            step: i32::from(step),
            total_width: 0,
        }
    }

    /// Moves the crawl one step for a row `display_width` columns wide.
    pub fn advance(&mut self, messages: &TickerMessages, display_width: u16) {
        let width = i32::from(display_width);

        if self.strips.is_empty() {
            let Some(index) = messages.first_non_empty() else {
                return;
            };
            self.first_x = width;
            self.enqueue(messages, index);
        }

        self.first_x -= self.step;

        while let Some(front) = self.strips.front() {
            if self.first_x + front.width >= 0 {
                break;
            }
            self.first_x += front.width;
            self.total_width -= front.width;
            self.strips.pop_front();
        }

        while self.first_x + self.total_width < width {
            let Some(index) = messages.next_non_empty(self.cursor) else {
                break;
            };
            self.enqueue(messages, index);
        }
    }

    fn enqueue(&mut self, messages: &TickerMessages, index: usize) {
        let Some(message) = messages.get(index) else {
            return;
        };
        let strip = Strip::from_message(message);
        self.total_width += strip.width;
        self.strips.push_back(strip);
        self.cursor = index;
    }

    /// Draws the queued strips into `row`, clipping at both edges.
    pub fn render(&self, row: Rect, buf: &mut Buffer) {
        let right = i32::from(row.width);
        let mut x = self.first_x;
        for strip in &self.strips {
            if x >= right {
                break;
            }
            let mut column = x;
            for ch in strip.text.chars() {
                let width = char_columns(ch);
                if column >= 0 && column + width <= right {
                    let mut encoded = [0; 4];
                    buf.set_string(
                        row.x + column as u16,
                        row.y,
                        ch.encode_utf8(&mut encoded),
                        strip.style,
                    );
                }
                column += width;
            }
            x += strip.width;
        }
    }

    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }

    pub fn leading_x(&self) -> i32 {
        self.first_x
    }
}
