use crate::fmt::number;
use crate::models::{NormalizedTable, TypedRow, TypedTable};

pub const FIELD_SEPARATOR: &str = " | ";

/// First line of the raw preview emitted when no row renders.
pub const NO_ROWS_MARKER: &str = "No rows parsed. Raw preview:";

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub lines: usize,
    pub used_preview: bool,
}

fn is_blank(line: &str) -> bool {
    line.split(FIELD_SEPARATOR).all(|part| part.trim().is_empty())
}

/// `date | description | amount [| balance]`, or the row's raw cells
/// when every canonical part is empty. `None` when the row has no data.
pub fn render_row(row: &TypedRow, has_balance: bool) -> Option<String> {
    let mut parts = vec![
        row.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        row.description.clone(),
        row.amount.map(number).unwrap_or_default(),
    ];
    if has_balance {
        parts.push(row.balance.map(number).unwrap_or_default());
    }
    let line = parts.join(FIELD_SEPARATOR);
    if !is_blank(&line) {
        return Some(line);
    }
    let fallback = row.raw.join(FIELD_SEPARATOR);
    if is_blank(&fallback) {
        None
    } else {
        Some(fallback)
    }
}

/// Header plus up to `limit` original rows, delimiter-separated, under
/// [`NO_ROWS_MARKER`].
pub fn preview(table: &NormalizedTable, delimiter: u8, limit: usize) -> String {
    let sep = (delimiter as char).to_string();
    let mut lines = vec![NO_ROWS_MARKER.to_string()];
    if !table.source_header.is_empty() {
        lines.push(table.source_header.join(&sep));
    }
    lines.extend(table.rows.iter().take(limit).map(|row| row.join(&sep)));
    lines.join("\n")
}

pub fn render(table: &NormalizedTable, typed: &TypedTable, delimiter: u8, preview_rows: usize) -> Rendered {
    let lines: Vec<String> = typed
        .rows
        .iter()
        .filter_map(|row| render_row(row, typed.has_balance))
        .collect();
    if lines.is_empty() {
        tracing::info!("no renderable rows, emitting raw preview");
        return Rendered {
            text: preview(table, delimiter, preview_rows),
            lines: 0,
            used_preview: true,
        };
    }
    Rendered {
        text: lines.join("\n"),
        lines: lines.len(),
        used_preview: false,
    }
}
