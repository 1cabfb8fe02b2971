use crate::api::RowResult;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

pub const CSV_COLUMNS: [&str; 5] = ["index", "status", "score", "anonymizedText", "matches"];

/// 2-space-indented JSON, UTF-8, keys in the source struct's natural order.
/// Serialization failure is a real error the caller must surface to the user.
pub fn format_as_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).with_context(|| "serializing result to JSON")
}

/// UTF-8 passthrough. `None` for empty input; callers check before exporting.
pub fn format_as_plain_text(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() {
        return None;
    }
    Some(text.as_bytes().to_vec())
}

/// Fixed-order CSV with every cell quote-escaped, header row first, lines
/// joined with `\n`. `None` for an empty row sequence; that is a caller
/// precondition, not an error.
pub fn format_rows_as_csv(rows: &[RowResult]) -> Option<Vec<u8>> {
    if rows.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(join_cells(CSV_COLUMNS.iter().map(|h| h.to_string())));

    for row in rows {
        let cells = [
            row.index.to_string(),
            row.status.clone(),
            number_cell(row.score),
            row.anonymized_text.clone().unwrap_or_default(),
            row.matches.as_ref().map(value_cell).unwrap_or_default(),
        ];
        lines.push(join_cells(cells.into_iter()));
    }

    Some(lines.join("\n").into_bytes())
}

fn join_cells<I: Iterator<Item = String>>(cells: I) -> String {
    cells
        .map(|c| escape_cell(&c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Inner double quotes are doubled and the result wrapped in a quote pair.
/// An empty cell comes out as `""`, never the literal text `null`.
fn escape_cell(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

fn number_cell(n: f64) -> String {
    serde_json::to_string(&n).unwrap_or_default()
}

/// Strings pass through as-is; anything else is JSON-stringified; `null`
/// renders empty.
fn value_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
