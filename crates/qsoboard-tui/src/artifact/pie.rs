use std::f64::consts::TAU;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Paragraph, Widget};

use super::{palette_color, render_placeholder, titled_block};

/// Braille dots per cell.
const DOTS_X: usize = 2;
const DOTS_Y: usize = 4;

/// Sector index for a point at `angle` (radians clockwise from the top),
/// given cumulative sector ends as fractions of a full turn.
fn sector_at(angle: f64, ends: &[f64]) -> usize {
    let turn = angle / TAU;
    ends.iter()
        .position(|end| turn < *end)
        .unwrap_or(ends.len().saturating_sub(1))
}

/// Dot coordinates in canvas space (`[-1, 1]` on both axes) grouped by sector.
fn sector_points(values: &[u64], dots_wide: usize, dots_high: usize) -> Vec<Vec<(f64, f64)>> {
    let total: u64 = values.iter().sum();
    let mut ends = Vec::with_capacity(values.len());
    let mut running = 0_u64;
    for value in values {
        running += value;
        ends.push(running as f64 / total as f64);
    }

    let mut sectors = vec![Vec::new(); values.len()];
    for row in 0..dots_high {
        let y = 1.0 - (row as f64 + 0.5) * 2.0 / dots_high as f64;
        for col in 0..dots_wide {
            let x = (col as f64 + 0.5) * 2.0 / dots_wide as f64 - 1.0;
            if x * x + y * y > 1.0 {
                continue;
            }
            let angle = x.atan2(y).rem_euclid(TAU);
            let sector = sector_at(angle, &ends);
            if values[sector] > 0 {
                sectors[sector].push((x, y));
            }
        }
    }
    sectors
}

pub(super) fn render(labels: &[String], values: &[u64], title: &str, area: Rect, buf: &mut Buffer) {
    let total: u64 = values.iter().sum();
    if total == 0 {
        render_placeholder(title, area, buf);
        return;
    }

    let block = titled_block(title);
    let inner = block.inner(area);
    block.render(area, buf);

    // A cell is about twice as tall as it is wide, so a round pie is twice
    // as many columns as rows.
    let pie_width = (inner.height * 2).min(inner.width * 2 / 3);
    let [pie_area, legend_area] =
        Layout::horizontal([Constraint::Length(pie_width), Constraint::Fill(1)]).areas(inner);

    let sectors = sector_points(
        values,
        usize::from(pie_area.width) * DOTS_X,
        usize::from(pie_area.height) * DOTS_Y,
    );
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for (index, coords) in sectors.iter().enumerate() {
                ctx.draw(&Points {
                    coords,
                    color: palette_color(index),
                });
            }
        })
        .render(pie_area, buf);

    let legend: Vec<Line> = labels
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (label, value))| {
            let percent = *value as f64 * 100.0 / total as f64;
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(palette_color(index))),
                Span::raw(format!("{label}  {value} ({percent:.1}%)")),
            ])
        })
        .collect();
    let height = (legend.len() as u16).min(legend_area.height);
    let top = legend_area.y + (legend_area.height - height) / 2;
    Paragraph::new(legend)
        .style(Style::default().fg(Color::White))
        .render(
            Rect::new(legend_area.x + 1, top, legend_area.width.saturating_sub(1), height),
            buf,
        );
}
