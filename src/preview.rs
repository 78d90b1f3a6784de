//! Plain-text preview of the first rows of a table

use crate::table::Table;
use serde_json::Value;
use std::fmt::Write as _;

/// Cells longer than this are cut and suffixed with `...`
pub const MAX_CELL_WIDTH: usize = 40;

const NULL_CELL: &str = "NULL";

/// Render up to `max_rows` rows as an aligned table with a summary line
pub fn render_preview(table: &Table, max_rows: usize) -> String {
    let headers: Vec<String> = table.columns.iter().map(|c| fit(&c.name)).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(max_rows)
        .map(|row| row.iter().map(|v| fit(&cell_text(v))).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    if !headers.is_empty() {
        let _ = writeln!(output, "{}", format_row(&headers, &widths));
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(output, "{}", format_row(&separator, &widths));
        for row in &rows {
            let _ = writeln!(output, "{}", format_row(row, &widths));
        }
    }
    let _ = writeln!(
        output,
        "Preview ({} of {} rows)",
        rows.len(),
        table.row_count()
    );
    output
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => NULL_CELL.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten control whitespace and truncate to `MAX_CELL_WIDTH` characters
fn fit(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .collect();

    if flat.chars().count() <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut cut: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}
