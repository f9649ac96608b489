//! Output formatting for the CLI.

use crate::models::{Table, Value};

/// Format a real the way it reads in a data frame: always with a decimal point.
pub fn format_real(r: f64) -> String {
    if r.is_nan() {
        "NaN".to_string()
    } else if r.is_infinite() {
        (if r > 0.0 { "inf" } else { "-inf" }).to_string()
    } else if r.fract() == 0.0 && r.abs() < 1e16 {
        format!("{r:.1}")
    } else {
        format!("{r}")
    }
}

/// Format a cell inside a frame.
fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "NaN".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => format_real(*r),
        Value::Text(s) => s.clone(),
    }
}

/// Format a cell inside a row tuple.
fn format_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => format_real(*r),
        Value::Text(s) if s.contains('\'') && !s.contains('"') => format!("\"{s}\""),
        Value::Text(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
    }
}

/// Format one record as a tuple, e.g. `('A', 100.0, 'Active')`.
pub fn format_row(row: &[Value]) -> String {
    let parts: Vec<String> = row.iter().map(format_literal).collect();
    if parts.len() == 1 {
        format!("({},)", parts[0])
    } else {
        format!("({})", parts.join(", "))
    }
}

/// Format a whole table with a leading row index and right-aligned columns.
pub fn format_frame(table: &Table) -> String {
    if table.is_empty() {
        return format!(
            "Empty DataFrame\nColumns: [{}]\nIndex: []",
            table.column_names().join(", ")
        );
    }

    let index: Vec<String> = (0..table.len()).map(|i| i.to_string()).collect();
    let index_width = index.iter().map(String::len).max().unwrap_or(0);

    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(table.len() + 1);

    let mut header = " ".repeat(index_width);
    for (col, width) in table.columns.iter().zip(widths.iter().copied()) {
        header.push_str(&format!("  {:>width$}", col.name));
    }
    lines.push(header);

    for (label, row) in index.iter().zip(&cells) {
        let mut line = format!("{label:<index_width$}");
        for (cell, width) in row.iter().zip(widths.iter().copied()) {
            line.push_str(&format!("  {cell:>width$}"));
        }
        lines.push(line);
    }

    lines.join("\n")
}
