//! DuckDB-backed collaborators: catalog introspection and raw SQL execution.
//!
//! Everything in this crate touches a live [`duckdb::Connection`]. The
//! schema model itself lives in `p2q-schema` and stays free of any
//! database dependency so it can be tested without one.

mod exec;
mod introspect;

pub use exec::{execute_query, ExecutionError, QueryOutcome, QueryResult};
pub use introspect::{
    extract_foreign_keys, extract_primary_keys, extract_tables, snapshot, MetadataError,
};
