//! Text and JSON renderings of table snapshots.

use crate::table::{Row, TableSnapshot};

/// Separator drawn between columns.
const COLUMN_GAP: &str = " | ";

/// Render headers and rows as an aligned text grid.
///
/// ```text
/// Reg No | Name  | Course
/// -------+-------+-------
/// A1     | Alice | CS
/// ```
pub fn render_grid(headers: &[String], rows: &[Row]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (width, field) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(field));
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("-+-").trim_end());
    out.push('\n');

    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

/// Render a snapshot as pretty-printed JSON.
pub fn render_json(snapshot: &TableSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// One-line summary shown under a grid.
pub fn row_count_label(count: usize) -> String {
    match count {
        1 => "1 row".to_string(),
        n => format!("{} rows", n),
    }
}

fn push_line(out: &mut String, fields: &[String], widths: &[usize]) {
    let cells: Vec<String> = fields
        .iter()
        .zip(widths)
        .map(|(field, width)| pad(field, *width))
        .collect();
    out.push_str(cells.join(COLUMN_GAP).trim_end());
    out.push('\n');
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(fill))
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}
