//! Off-screen rendering of dashboard views.
//!
//! Every artifact is a `ratatui` [`Buffer`] sized to the display area above
//! the ticker. The display blits the current one into the frame; nothing here
//! touches the terminal.

mod chart;
mod pie;
mod table;

use anyhow::{Result, bail};
use qsoboard_core::contest::ContestWindow;
use qsoboard_core::render::{ArtifactRenderer, DisplaySize, NamedSeries};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Widget};

/// Series / sector colors, in assignment order.
pub(crate) const PALETTE: [Color; 9] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Rgb(0xff, 0x99, 0x00),
    Color::Rgb(0x00, 0xff, 0x00),
    Color::Rgb(0x99, 0x66, 0x33),
];

pub(crate) const NO_DATA: &str = "No data yet";

pub(crate) fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Renders dashboard views into terminal buffers.
#[derive(Debug, Clone, Default)]
pub struct TerminalRenderer {
    /// Fixes the rate chart's time axis to the contest when set.
    window: Option<ContestWindow>,
}

impl TerminalRenderer {
    pub fn new(window: Option<ContestWindow>) -> Self {
        Self { window }
    }
}

fn blank(size: DisplaySize) -> Result<Buffer> {
    if size.is_empty() {
        bail!("display area is empty ({}x{})", size.width, size.height);
    }
    Ok(Buffer::empty(Rect::new(0, 0, size.width, size.height)))
}

pub(crate) fn titled_block(title: &str) -> Block<'static> {
    Block::bordered()
        .title(Line::from(format!(" {title} ")).bold())
        .title_alignment(Alignment::Center)
}

/// Centered placeholder used when a view has nothing to draw.
pub(crate) fn render_placeholder(title: &str, area: Rect, buf: &mut Buffer) {
    let block = titled_block(title);
    let inner = block.inner(area);
    block.render(area, buf);
    let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, inner.height.min(1));
    Paragraph::new(NO_DATA)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .render(middle, buf);
}

impl ArtifactRenderer for TerminalRenderer {
    type Artifact = Buffer;

    fn render_title_card(&self, title: &str, lines: &[String], size: DisplaySize) -> Result<Buffer> {
        let mut buf = blank(size)?;
        let area = buf.area;

        let mut text = vec![
            Line::from(title.to_string())
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Line::default(),
        ];
        text.extend(lines.iter().map(|line| Line::from(line.clone())));

        let height = (text.len() as u16).min(area.height);
        let top = area.y + (area.height - height) / 2;
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(Rect::new(area.x, top, area.width, height), &mut buf);
        Ok(buf)
    }

    fn render_table(&self, cells: &[Vec<String>], title: &str, size: DisplaySize) -> Result<Buffer> {
        let mut buf = blank(size)?;
        let area = buf.area;
        table::render(cells, title, area, &mut buf);
        Ok(buf)
    }

    fn render_pie_chart(
        &self,
        labels: &[String],
        values: &[u64],
        title: &str,
        size: DisplaySize,
    ) -> Result<Buffer> {
        if labels.len() != values.len() {
            bail!(
                "pie '{title}' has {} labels for {} values",
                labels.len(),
                values.len()
            );
        }
        let mut buf = blank(size)?;
        let area = buf.area;
        pie::render(labels, values, title, area, &mut buf);
        Ok(buf)
    }

    fn render_stacked_time_series(
        &self,
        series: &[NamedSeries],
        title: &str,
        size: DisplaySize,
    ) -> Result<Buffer> {
        let mut buf = blank(size)?;
        let area = buf.area;
        chart::render(series, self.window.as_ref(), title, area, &mut buf);
        Ok(buf)
    }
}

/// Copies `artifact` into `dst` with its top-left corner at `(x, y)`,
/// clipped to `clip`.
pub fn blit(artifact: &Buffer, dst: &mut Buffer, x: u16, y: u16, clip: Rect) {
    let clip = clip.intersection(dst.area);
    let src = artifact.area;
    for row in 0..src.height {
        for col in 0..src.width {
            let (dx, dy) = (x.saturating_add(col), y.saturating_add(row));
            if dx < clip.left() || dx >= clip.right() || dy < clip.top() || dy >= clip.bottom() {
                continue;
            }
            let Some(cell) = artifact.cell((src.x + col, src.y + row)) else {
                continue;
            };
            if let Some(target) = dst.cell_mut((dx, dy)) {
                *target = cell.clone();
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell((x, y)) {
                out.push_str(cell.symbol());
            }
        }
        out.push('\n');
    }
    out
}
