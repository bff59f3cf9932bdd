//! Terminal rendering of query results

use p2q_duck::{QueryOutcome, QueryResult};
use unicode_width::UnicodeWidthStr;

/// How a JSON cell prints: strings raw, null empty, everything else via
/// its JSON form.
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a query outcome for the terminal.
///
/// Statements with no result set and empty results get a one-line message;
/// single-column results print as a plain list; everything else gets a
/// psql-style grid.
pub fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Statement => {
            "No results to fetch (possibly a non-SELECT query).".to_string()
        }
        QueryOutcome::Rows(result) if result.rows.is_empty() => "No results found.".to_string(),
        QueryOutcome::Rows(result) if result.columns.len() == 1 => {
            let mut out = format!("\n{}:", result.columns[0]);
            for row in &result.rows {
                out.push('\n');
                out.push_str(&display_value(&row[0]));
            }
            out
        }
        QueryOutcome::Rows(result) => grid(result),
    }
}

/// psql-style grid:
///
/// ```text
/// +------+-------+
/// | name | total |
/// |------+-------|
/// | a    | 19.5  |
/// +------+-------+
/// ```
fn grid(result: &QueryResult) -> String {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(display_value).collect())
        .collect();

    // Column widths are display widths, so non-ASCII text lines up.
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.width()).collect();
    for row in &cells {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.width());
        }
    }

    let border = edge_line(&widths);
    let mut lines = vec![border.clone(), row_line(&result.columns, &widths)];
    lines.push(separator_line(&widths));
    for row in &cells {
        lines.push(row_line(row, &widths));
    }
    lines.push(border);
    lines.join("\n")
}

fn edge_line(widths: &[usize]) -> String {
    let runs: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("+{}+", runs.join("+"))
}

fn separator_line(widths: &[usize]) -> String {
    let runs: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("|{}|", runs.join("+"))
}

fn row_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let cell = cell.as_ref();
            format!(" {}{} ", cell, " ".repeat(width - cell.width()))
        })
        .collect();
    format!("|{}|", padded.join("|"))
}
