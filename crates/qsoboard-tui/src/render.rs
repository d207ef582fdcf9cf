//! Pure render: draws the shown artifact and the ticker row. No state mutation.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::artifact;
use crate::state::DashboardState;

pub fn render(state: &DashboardState, frame: &mut Frame) {
    let area = frame.area();
    draw(state, area, frame.buffer_mut());
}

fn draw(state: &DashboardState, area: Rect, buf: &mut Buffer) {
    let [artifact_area, ticker_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

    if let Some(shown) = &state.shown {
        // Centered horizontally, top aligned; oversized artifacts are clipped.
        let x = artifact_area.x + artifact_area.width.saturating_sub(shown.area.width) / 2;
        artifact::blit(shown, buf, x, artifact_area.y, artifact_area);
    }

    buf.set_style(ticker_area, Style::default().bg(Color::Black));
    state.ticker.render(ticker_area, buf);
}
