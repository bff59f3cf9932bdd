//! Rendering a snapshot into the prompt-facing schema description
//!
//! The layout here is a contract with the text-completion collaborator:
//! labels, ordering and indentation are injected verbatim into the
//! generation prompt, so they must stay byte-stable. Paraphrasing the
//! format changes model behavior and counts as a regression.

use crate::SchemaSnapshot;

impl SchemaSnapshot {
    /// Render the schema description. Identical snapshots produce
    /// byte-identical output.
    ///
    /// Sections, in order: a fixed header block, one block per table in
    /// snapshot order, and — only when foreign keys exist — a
    /// relationships list and a join-pattern list, both in edge
    /// extraction order (duplicate edges render twice).
    pub fn describe(&self) -> String {
        let mut lines: Vec<String> = vec![
            "DATABASE SCHEMA DESCRIPTION".to_string(),
            String::new(),
            "TABLES AND COLUMNS:".to_string(),
        ];

        for table in &self.tables {
            lines.push(format!("\n{} TABLE", table.name.to_uppercase()));
            lines.push("Columns:".to_string());
            for col in &table.columns {
                let nullable = if col.is_nullable { "NULL" } else { "NOT NULL" };
                let pk = if self.is_primary_key(&table.name, &col.name) {
                    " (PRIMARY KEY)"
                } else {
                    ""
                };
                lines.push(format!("- {}: {} {}{}", col.name, col.data_type, nullable, pk));
            }
        }

        if !self.foreign_keys.is_empty() {
            lines.push("\nTABLE RELATIONSHIPS:".to_string());
            for fk in &self.foreign_keys {
                lines.push(format!(
                    "- {}.{} -> {}.{}",
                    fk.table, fk.column, fk.ref_table, fk.ref_column
                ));
            }

            lines.push("\nCOMMON JOIN PATTERNS:".to_string());
            for fk in &self.foreign_keys {
                lines.push(format!(
                    "- To get data from {} with {}:\n  JOIN {} ON {}.{} = {}.{}",
                    fk.table,
                    fk.ref_table,
                    fk.ref_table,
                    fk.table,
                    fk.column,
                    fk.ref_table,
                    fk.ref_column
                ));
            }
        }

        lines.join("\n")
    }
}
