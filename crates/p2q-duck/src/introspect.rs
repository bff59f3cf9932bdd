//! Schema extraction from DuckDB's information_schema catalog.

use std::collections::{BTreeMap, BTreeSet};

use duckdb::{Connection, Result as DuckResult};
use p2q_schema::{ColumnInfo, ForeignKey, SchemaSnapshot, TableInfo};
use thiserror::Error;

/// The metadata catalog could not be read.
///
/// Analysis is all-or-nothing: any catalog failure aborts the pass and no
/// partial snapshot is published.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("schema metadata unavailable: {0}")]
    Unavailable(#[from] duckdb::Error),
}

/// Extract every base table in the `main` schema together with its columns.
///
/// Tables come back ordered by name; columns keep their declared
/// (ordinal) order. Views are excluded.
pub fn extract_tables(conn: &Connection) -> Result<Vec<TableInfo>, MetadataError> {
    let query = "
        SELECT t.table_name, c.column_name, c.data_type, c.is_nullable, c.column_default
        FROM information_schema.tables t
        JOIN information_schema.columns c
          ON c.table_name = t.table_name AND c.table_schema = t.table_schema
        WHERE t.table_schema = 'main' AND t.table_type = 'BASE TABLE'
        ORDER BY t.table_name, c.ordinal_position
    ";

    let mut stmt = conn.prepare(query)?;
    let mut rows = stmt.query([])?;

    let mut tables: Vec<TableInfo> = Vec::new();
    while let Some(row) = rows.next()? {
        let table_name: String = row.get(0)?;
        let column = ColumnInfo {
            name: row.get(1)?,
            data_type: row.get(2)?,
            is_nullable: row.get::<_, String>(3)? == "YES",
            default: row.get(4)?,
        };

        // Rows arrive grouped by table, so appending to the last entry
        // preserves ordinal order within each table.
        match tables.last_mut() {
            Some(last) if last.name == table_name => last.columns.push(column),
            _ => tables.push(TableInfo {
                name: table_name,
                columns: vec![column],
            }),
        }
    }

    Ok(tables)
}

/// Extract primary key membership, keyed by table name.
///
/// Composite keys yield one set with every member column; tables without a
/// declared key are absent from the map.
pub fn extract_primary_keys(
    conn: &Connection,
) -> Result<BTreeMap<String, BTreeSet<String>>, MetadataError> {
    let query = "
        SELECT tc.table_name, kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON kcu.constraint_name = tc.constraint_name
         AND kcu.table_name = tc.table_name
        WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = 'main'
    ";

    let mut stmt = conn.prepare(query)?;
    let mut rows = stmt.query([])?;

    let mut keys: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let table_name: String = row.get(0)?;
        let column_name: String = row.get(1)?;
        keys.entry(table_name).or_default().insert(column_name);
    }

    Ok(keys)
}

/// Extract foreign key edges: referencing table/column paired with the
/// referenced table/column.
///
/// Edges are ordered by referencing table, then key ordinal. Duplicate
/// edges between the same pair of tables are kept as-is.
pub fn extract_foreign_keys(conn: &Connection) -> Result<Vec<ForeignKey>, MetadataError> {
    let query = "
        SELECT tc.table_name, kcu.column_name,
               ccu.table_name AS ref_table, ccu.column_name AS ref_column
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON kcu.constraint_name = tc.constraint_name
         AND kcu.table_name = tc.table_name
        JOIN information_schema.constraint_column_usage ccu
          ON ccu.constraint_name = tc.constraint_name
        WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = 'main'
        ORDER BY tc.table_name, kcu.ordinal_position
    ";

    let mut stmt = conn.prepare(query)?;
    let edges = stmt
        .query_map([], |row| {
            Ok(ForeignKey {
                table: row.get(0)?,
                column: row.get(1)?,
                ref_table: row.get(2)?,
                ref_column: row.get(3)?,
            })
        })?
        .collect::<DuckResult<Vec<_>>>()?;

    Ok(edges)
}

/// Run one full analysis pass over the connection's `main` schema.
pub fn snapshot(conn: &Connection) -> Result<SchemaSnapshot, MetadataError> {
    let tables = extract_tables(conn)?;
    let primary_keys = extract_primary_keys(conn)?;
    let foreign_keys = extract_foreign_keys(conn)?;

    tracing::debug!(
        tables = tables.len(),
        foreign_keys = foreign_keys.len(),
        "schema analysis complete"
    );

    Ok(SchemaSnapshot {
        tables,
        primary_keys,
        foreign_keys,
    })
}
