//! Join inference over direct foreign-key adjacency

use crate::SchemaSnapshot;
use std::collections::BTreeSet;

impl SchemaSnapshot {
    /// Suggest join clauses for a set of tables of interest.
    ///
    /// Every unordered pair of input tables is considered in lexicographic
    /// order; each foreign-key edge connecting a pair directly (in either
    /// direction) contributes one `LEFT JOIN`, in edge extraction order.
    /// Single-hop only — a pair linked through an intermediate table
    /// yields nothing. Duplicate edges yield duplicate suggestions. Fewer
    /// than two tables yields nothing.
    ///
    /// The output is a hint surfaced to the user before generation; the
    /// completion service decides actual join logic from the full schema
    /// description.
    pub fn suggest_joins(&self, tables: &BTreeSet<String>) -> Vec<String> {
        let names: Vec<&str> = tables.iter().map(String::as_str).collect();
        let mut joins = Vec::new();

        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                for fk in &self.foreign_keys {
                    if fk.connects(names[i], names[j]) {
                        joins.push(fk.join_clause());
                    }
                }
            }
        }

        joins
    }

    /// Tables whose names occur, case-insensitively, as substrings of the
    /// prompt.
    pub fn tables_mentioned_in(&self, prompt: &str) -> BTreeSet<String> {
        let prompt = prompt.to_lowercase();
        self.tables
            .iter()
            .filter(|t| prompt.contains(&t.name.to_lowercase()))
            .map(|t| t.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ForeignKey, SchemaSnapshot, TableInfo};
    use std::collections::BTreeSet;

    fn fk(table: &str, column: &str, ref_table: &str, ref_column: &str) -> ForeignKey {
        ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
            ref_table: ref_table.to_string(),
            ref_column: ref_column.to_string(),
        }
    }

    fn snapshot_with(edges: Vec<ForeignKey>) -> SchemaSnapshot {
        SchemaSnapshot {
            foreign_keys: edges,
            ..Default::default()
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_single_edge_single_suggestion() {
        let snapshot = snapshot_with(vec![fk("orders", "user_id", "users", "id")]);
        assert_eq!(
            snapshot.suggest_joins(&set(&["users", "orders"])),
            vec!["LEFT JOIN users ON orders.user_id = users.id".to_string()]
        );
    }

    #[test]
    fn test_pair_matches_in_either_direction() {
        let snapshot = snapshot_with(vec![fk("orders", "user_id", "users", "id")]);
        // BTreeSet ordering makes the input order irrelevant anyway, but the
        // edge itself must match regardless of which side references which.
        assert_eq!(snapshot.suggest_joins(&set(&["orders", "users"])).len(), 1);
        assert_eq!(snapshot.suggest_joins(&set(&["users", "orders"])).len(), 1);
    }

    #[test]
    fn test_fewer_than_two_tables_yields_nothing() {
        let snapshot = snapshot_with(vec![fk("orders", "user_id", "users", "id")]);
        assert!(snapshot.suggest_joins(&BTreeSet::new()).is_empty());
        assert!(snapshot.suggest_joins(&set(&["orders"])).is_empty());
    }

    #[test]
    fn test_unconnected_pair_yields_nothing() {
        let snapshot = snapshot_with(vec![fk("orders", "user_id", "users", "id")]);
        assert!(snapshot.suggest_joins(&set(&["users", "products"])).is_empty());
    }

    #[test]
    fn test_no_transitive_paths() {
        // a -> b -> c: asking about {a, c} must not walk through b.
        let snapshot = snapshot_with(vec![
            fk("a", "b_id", "b", "id"),
            fk("b", "c_id", "c", "id"),
        ]);
        assert!(snapshot.suggest_joins(&set(&["a", "c"])).is_empty());
        assert_eq!(snapshot.suggest_joins(&set(&["a", "b", "c"])).len(), 2);
    }

    #[test]
    fn test_duplicate_edges_duplicate_suggestions() {
        let snapshot = snapshot_with(vec![
            fk("orders", "user_id", "users", "id"),
            fk("orders", "user_id", "users", "id"),
        ]);
        let joins = snapshot.suggest_joins(&set(&["users", "orders"]));
        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0], joins[1]);
    }

    #[test]
    fn test_pair_order_then_edge_order() {
        // Pairs in lexicographic order: (a, b) before (a, c); within a
        // pair, edges keep extraction order.
        let snapshot = snapshot_with(vec![
            fk("a", "c_id", "c", "id"),
            fk("a", "b_id", "b", "id"),
            fk("a", "b_alt", "b", "id"),
        ]);
        assert_eq!(
            snapshot.suggest_joins(&set(&["c", "a", "b"])),
            vec![
                "LEFT JOIN b ON a.b_id = b.id".to_string(),
                "LEFT JOIN b ON a.b_alt = b.id".to_string(),
                "LEFT JOIN c ON a.c_id = c.id".to_string(),
            ]
        );
    }

    #[test]
    fn test_cycles_are_safe() {
        // Self-loop plus a two-table cycle; the pairwise scan never
        // traverses, so cycles cannot recurse.
        let snapshot = snapshot_with(vec![
            fk("employees", "manager_id", "employees", "id"),
            fk("users", "last_order_id", "orders", "id"),
            fk("orders", "user_id", "users", "id"),
        ]);

        let joins = snapshot.suggest_joins(&set(&["users", "orders"]));
        assert_eq!(
            joins,
            vec![
                "LEFT JOIN orders ON users.last_order_id = orders.id".to_string(),
                "LEFT JOIN users ON orders.user_id = users.id".to_string(),
            ]
        );

        // The self-loop edge never pairs with a distinct table.
        assert!(snapshot
            .suggest_joins(&set(&["employees", "users"]))
            .is_empty());
    }

    #[test]
    fn test_mentioned_tables_case_insensitive_substring() {
        let snapshot = SchemaSnapshot {
            tables: vec![
                TableInfo {
                    name: "users".to_string(),
                    columns: vec![],
                },
                TableInfo {
                    name: "orders".to_string(),
                    columns: vec![],
                },
                TableInfo {
                    name: "products".to_string(),
                    columns: vec![],
                },
            ],
            ..Default::default()
        };

        let mentioned = snapshot.tables_mentioned_in("Show all Users with their ORDERS");
        assert_eq!(mentioned, set(&["users", "orders"]));

        assert!(snapshot.tables_mentioned_in("total revenue").is_empty());
    }
}
