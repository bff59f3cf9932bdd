//! Schema snapshot model, description rendering and join inference
//!
//! The snapshot is a pure in-memory capture of a database's structure
//! (tables, columns, primary keys, foreign keys). Extraction lives in
//! `p2q-duck`; everything here is a deterministic transformation over an
//! immutable snapshot, with no I/O and no state across calls.

mod describe;
mod joins;
mod snapshot;

pub use snapshot::{ColumnInfo, ForeignKey, SchemaSnapshot, TableInfo};
