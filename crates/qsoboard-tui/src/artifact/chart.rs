use chrono::DateTime;
use qsoboard_core::contest::ContestWindow;
use qsoboard_core::render::NamedSeries;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Widget};

use super::{palette_color, render_placeholder, titled_block};

/// Each series shifted up by the sum of the series before it.
fn stack(series: &[NamedSeries]) -> Vec<Vec<(f64, f64)>> {
    let longest = series.iter().map(|s| s.points.len()).max().unwrap_or(0);
    let mut running = vec![0.0; longest];
    series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .zip(running.iter_mut())
                .map(|((start, value), base)| {
                    *base += value;
                    (*start as f64, *base)
                })
                .collect()
        })
        .collect()
}

fn x_bounds(stacked: &[Vec<(f64, f64)>], window: Option<&ContestWindow>) -> [f64; 2] {
    let xs = stacked.iter().flatten().map(|(x, _)| *x);
    let mut lo = xs.clone().fold(f64::INFINITY, f64::min);
    let mut hi = xs.fold(f64::NEG_INFINITY, f64::max);
    if let Some(window) = window {
        lo = lo.min(window.start.timestamp() as f64);
        hi = hi.max(window.end.timestamp() as f64);
    }
    if hi <= lo {
        hi = lo + 3_600.0;
    }
    [lo, hi]
}

fn hour_label(timestamp: f64) -> Line<'static> {
    let label = DateTime::from_timestamp(timestamp as i64, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();
    Line::from(label)
}

pub(super) fn render(
    series: &[NamedSeries],
    window: Option<&ContestWindow>,
    title: &str,
    area: Rect,
    buf: &mut Buffer,
) {
    if series.iter().all(|s| s.points.is_empty()) {
        render_placeholder(title, area, buf);
        return;
    }

    let stacked = stack(series);
    let [x_lo, x_hi] = x_bounds(&stacked, window);
    let y_max = stacked
        .iter()
        .flatten()
        .map(|(_, y)| *y)
        .fold(0.0, f64::max);
    let y_hi = (y_max * 1.1).max(1.0);

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&stacked)
        .enumerate()
        .map(|(index, (named, points))| {
            Dataset::default()
                .name(named.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(palette_color(index)))
                .data(points)
        })
        .collect();

    let axis_style = Style::default().fg(Color::White);
    Chart::new(datasets)
        .block(titled_block(title))
        .x_axis(
            Axis::default()
                .title("UTC Hour")
                .style(axis_style)
                .bounds([x_lo, x_hi])
                .labels([
                    hour_label(x_lo),
                    hour_label((x_lo + x_hi) / 2.0),
                    hour_label(x_hi),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("QSO Rate/Hour")
                .style(axis_style)
                .bounds([0.0, y_hi])
                .labels([
                    Line::from("0"),
                    Line::from(format!("{:.0}", y_hi / 2.0)),
                    Line::from(format!("{y_hi:.0}")),
                ]),
        )
        .render(area, buf);
}
