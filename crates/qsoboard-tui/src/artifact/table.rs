use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Cell, Padding, Row, Table, Widget};
use unicode_width::UnicodeWidthStr;

use super::{render_placeholder, titled_block};

const COLUMN_SPACING: u16 = 2;

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.trim().parse::<f64>().is_ok()
}

/// Draws `cells` (header first) as a bordered table centered in `area`.
/// Numeric cells are right-aligned; the last row is highlighted when it is a
/// `Total` row.
pub(super) fn render(cells: &[Vec<String>], title: &str, area: Rect, buf: &mut Buffer) {
    let Some((header, body)) = cells.split_first() else {
        render_placeholder(title, area, buf);
        return;
    };
    let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        render_placeholder(title, area, buf);
        return;
    }

    let mut widths = vec![0_u16; columns];
    for row in cells {
        for (width, text) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.width() as u16);
        }
    }

    let content_width: u16 = widths.iter().sum::<u16>() + COLUMN_SPACING * (columns as u16 - 1);
    let table_width = (content_width + 4).max(title.width() as u16 + 4).min(area.width);
    // Borders, header and its bottom margin, then one line per row.
    let table_height = (body.len() as u16 + 4).min(area.height);
    let table_area = Rect::new(
        area.x + (area.width - table_width) / 2,
        area.y + (area.height - table_height) / 2,
        table_width,
        table_height,
    );

    let to_row = |row: &Vec<String>, style: Style| {
        let cells = row.iter().map(|text| {
            let line = Line::from(text.clone());
            Cell::from(if is_numeric(text) { line.right_aligned() } else { line })
        });
        Row::new(cells).style(style)
    };

    let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut rows: Vec<Row> = body.iter().map(|row| to_row(row, Style::default())).collect();
    if let Some(last) = body.last().filter(|row| row.first().is_some_and(|c| c == "Total")) {
        rows.pop();
        rows.push(to_row(last, Style::default().add_modifier(Modifier::BOLD)));
    }

    Table::new(rows, widths.iter().map(|w| Constraint::Length(*w)))
        .header(to_row(header, header_style).bottom_margin(1))
        .column_spacing(COLUMN_SPACING)
        .block(titled_block(title).padding(Padding::horizontal(1)))
        .render(table_area, buf);
}
