//! CSV export of query results

use std::path::{Path, PathBuf};

use p2q_duck::QueryResult;
use thiserror::Error;

use crate::render::display_value;

/// Export failed. Reported, never fatal to the session.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No results to export")]
    NoRows,

    #[error("Failed to create export directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Write a result set to `<dir>/<filename>.csv`.
///
/// Header row carries the column names; cells use the same display
/// mapping as the terminal renderer (null prints empty). When no filename
/// is given, one is generated from the current timestamp. A missing
/// `.csv` extension is appended. Empty result sets are rejected.
pub fn export_to_csv(
    result: &QueryResult,
    filename: Option<&str>,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    if result.rows.is_empty() {
        return Err(ExportError::NoRows);
    }

    let mut name = match filename {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "query_results_{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ),
    };
    if !name.ends_with(".csv") {
        name.push_str(".csv");
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(|cell| display_value(cell)))?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = result.rows.len(), "results exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_result() -> QueryResult {
        QueryResult {
            columns: vec!["name".to_string(), "total".to_string()],
            rows: vec![
                vec![json!("alice"), json!(19.5)],
                vec![json!("bob"), serde_json::Value::Null],
            ],
        }
    }

    fn temp_export_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("p2q_export_test_{tag}"))
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = temp_export_dir("rows");
        let path = export_to_csv(&sample_result(), Some("out.csv"), &dir).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "name,total\nalice,19.5\nbob,\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_appends_csv_extension() {
        let dir = temp_export_dir("ext");
        let path = export_to_csv(&sample_result(), Some("results"), &dir).unwrap();
        assert_eq!(path.file_name().unwrap(), "results.csv");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_auto_names_by_timestamp() {
        let dir = temp_export_dir("auto");
        let path = export_to_csv(&sample_result(), None, &dir).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("query_results_"));
        assert!(name.ends_with(".csv"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_rejects_empty_results() {
        let dir = temp_export_dir("empty");
        let empty = QueryResult {
            columns: vec!["name".to_string()],
            rows: vec![],
        };
        assert!(matches!(
            export_to_csv(&empty, None, &dir),
            Err(ExportError::NoRows)
        ));
    }

    #[test]
    fn test_export_empty_filename_auto_names() {
        let dir = temp_export_dir("blank");
        let path = export_to_csv(&sample_result(), Some(""), &dir).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("query_results_"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
