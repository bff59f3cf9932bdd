//! Raw SQL execution with rows marshalled into JSON values.

use duckdb::types::ValueRef;
use duckdb::Connection;
use thiserror::Error;

/// A statement failed to prepare or execute.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Error executing query: {0}")]
    Database(#[from] duckdb::Error),
}

/// Column names plus row data from a result-producing statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// What running a single statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A result set, possibly with zero rows.
    Rows(QueryResult),
    /// The statement ran but exposed no result set (DDL and friends).
    Statement,
}

/// Execute one SQL statement on the given connection.
///
/// Column names come from the executed statement's result schema, so a
/// SELECT that matches nothing still reports its columns. A statement
/// whose result has no columns at all maps to [`QueryOutcome::Statement`].
pub fn execute_query(conn: &Connection, sql: &str) -> Result<QueryOutcome, ExecutionError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;

    let columns: Vec<String> = match rows.as_ref() {
        Some(executed) => {
            let column_count = executed.column_count();
            let mut names = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                names.push(executed.column_name(idx)?.to_string());
            }
            names
        }
        None => Vec::new(),
    };

    let mut collected: Vec<Vec<serde_json::Value>> = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            record.push(json_value(row.get_ref(idx)?));
        }
        collected.push(record);
    }

    if columns.is_empty() {
        tracing::debug!(sql, "statement produced no result set");
        return Ok(QueryOutcome::Statement);
    }

    tracing::debug!(sql, rows = collected.len(), "query executed");
    Ok(QueryOutcome::Rows(QueryResult {
        columns,
        rows: collected,
    }))
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(i) => serde_json::json!(i),
        ValueRef::SmallInt(i) => serde_json::json!(i),
        ValueRef::Int(i) => serde_json::json!(i),
        ValueRef::BigInt(i) => serde_json::json!(i),
        ValueRef::HugeInt(i) => serde_json::json!(i),
        ValueRef::UTinyInt(i) => serde_json::json!(i),
        ValueRef::USmallInt(i) => serde_json::json!(i),
        ValueRef::UInt(i) => serde_json::json!(i),
        ValueRef::UBigInt(i) => serde_json::json!(i),
        ValueRef::Float(f) => serde_json::json!(f),
        ValueRef::Double(f) => serde_json::json!(f),
        ValueRef::Text(s) => serde_json::Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
        _ => serde_json::Value::String("<unsupported>".to_string()),
    }
}
