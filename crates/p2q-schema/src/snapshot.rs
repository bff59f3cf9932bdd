//! Snapshot types: tables, columns, primary keys, foreign-key edges

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single column as reported by the metadata source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type, verbatim from the catalog (e.g. `INTEGER`, `VARCHAR`).
    pub data_type: String,
    pub is_nullable: bool,
    /// Default-value expression, when the catalog reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A base table and its columns, in catalog ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// A foreign-key edge, directed from the referencing table to the
/// referenced one.
///
/// Edges may repeat and may form cycles or self-loops; nothing downstream
/// assumes the reference graph is acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub ref_table: String,
    pub ref_column: String,
}

impl ForeignKey {
    /// True when this edge connects exactly the two given tables, in
    /// either direction.
    pub fn connects(&self, t1: &str, t2: &str) -> bool {
        (self.table == t1 && self.ref_table == t2)
            || (self.table == t2 && self.ref_table == t1)
    }

    /// The join clause this edge suggests.
    pub fn join_clause(&self) -> String {
        format!(
            "LEFT JOIN {} ON {}.{} = {}.{}",
            self.ref_table, self.table, self.column, self.ref_table, self.ref_column
        )
    }
}

/// Immutable capture of one schema analysis pass.
///
/// Tables and foreign keys keep the metadata source's enumeration order;
/// primary keys are recorded as the full set of member columns per table,
/// so composite keys lose nothing. A snapshot is rebuilt wholesale on
/// re-analysis, never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub tables: Vec<TableInfo>,
    pub primary_keys: BTreeMap<String, BTreeSet<String>>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl SchemaSnapshot {
    /// Look up a table by exact name.
    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in snapshot (extraction) order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Primary-key member columns recorded for a table.
    pub fn primary_key_columns(&self, table: &str) -> Option<&BTreeSet<String>> {
        self.primary_keys.get(table)
    }

    /// Whether `column` belongs to `table`'s recorded primary key.
    pub fn is_primary_key(&self, table: &str, column: &str) -> bool {
        self.primary_keys
            .get(table)
            .is_some_and(|cols| cols.contains(column))
    }

    /// Simplified single-column lookup: `Some` only when exactly one
    /// member column is recorded for the table. Composite keys answer
    /// `None`; use [`SchemaSnapshot::primary_key_columns`] for the full
    /// set.
    pub fn single_primary_key(&self, table: &str) -> Option<&str> {
        match self.primary_keys.get(table) {
            Some(cols) if cols.len() == 1 => cols.iter().next().map(String::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fk(table: &str, column: &str, ref_table: &str, ref_column: &str) -> ForeignKey {
        ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
            ref_table: ref_table.to_string(),
            ref_column: ref_column.to_string(),
        }
    }

    #[test]
    fn test_connects_either_direction() {
        let edge = fk("orders", "user_id", "users", "id");
        assert!(edge.connects("orders", "users"));
        assert!(edge.connects("users", "orders"));
        assert!(!edge.connects("orders", "products"));
    }

    #[test]
    fn test_connects_self_loop() {
        let edge = fk("employees", "manager_id", "employees", "id");
        assert!(edge.connects("employees", "employees"));
        assert!(!edge.connects("employees", "users"));
    }

    #[test]
    fn test_join_clause_format() {
        let edge = fk("orders", "user_id", "users", "id");
        assert_eq!(
            edge.join_clause(),
            "LEFT JOIN users ON orders.user_id = users.id"
        );
    }

    #[test]
    fn test_single_primary_key_lookup() {
        let mut snapshot = SchemaSnapshot::default();
        snapshot
            .primary_keys
            .insert("users".to_string(), BTreeSet::from(["id".to_string()]));
        snapshot.primary_keys.insert(
            "order_items".to_string(),
            BTreeSet::from(["order_id".to_string(), "product_id".to_string()]),
        );

        assert_eq!(snapshot.single_primary_key("users"), Some("id"));
        // Composite keys have no single-column simplification.
        assert_eq!(snapshot.single_primary_key("order_items"), None);
        assert_eq!(snapshot.single_primary_key("missing"), None);

        assert!(snapshot.is_primary_key("order_items", "order_id"));
        assert!(snapshot.is_primary_key("order_items", "product_id"));
        assert!(!snapshot.is_primary_key("order_items", "quantity"));
    }

    #[test]
    fn test_table_lookup_is_case_sensitive() {
        let snapshot = SchemaSnapshot {
            tables: vec![TableInfo {
                name: "Users".to_string(),
                columns: vec![],
            }],
            ..Default::default()
        };
        assert!(snapshot.table("Users").is_some());
        assert!(snapshot.table("users").is_none());
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let snapshot = SchemaSnapshot {
            tables: vec![TableInfo {
                name: "users".to_string(),
                columns: vec![ColumnInfo {
                    name: "id".to_string(),
                    data_type: "INTEGER".to_string(),
                    is_nullable: false,
                    default: None,
                }],
            }],
            primary_keys: BTreeMap::from([(
                "users".to_string(),
                BTreeSet::from(["id".to_string()]),
            )]),
            foreign_keys: vec![fk("orders", "user_id", "users", "id")],
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SchemaSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
