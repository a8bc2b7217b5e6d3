// datacheck-core/src/infrastructure/adapters/csv.rs

use chrono::Utc;
use duckdb::Connection;
use std::path::Path;
use tracing::{info, instrument};

use crate::domain::dataset::{DatasetPreview, DatasetRecord};
use crate::error::DataCheckError;
use crate::infrastructure::adapters::duckdb::{collect_rows, sql_literal};
use crate::infrastructure::error::InfrastructureError;

pub const DEFAULT_PREVIEW_ROWS: usize = 3;

/// Turns an uploaded CSV file into a dataset record: column names, exact row
/// count and the first few rows. The rest of the file is not kept.
#[derive(Debug, Clone, Copy)]
pub struct CsvIngestor {
    preview_rows: usize,
}

impl Default for CsvIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_ROWS)
    }
}

impl CsvIngestor {
    pub fn new(preview_rows: usize) -> Self {
        Self {
            preview_rows: preview_rows.max(1),
        }
    }

    /// `name` defaults to the file stem.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn ingest(&self, path: &Path, name: Option<&str>) -> Result<DatasetRecord, DataCheckError> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(InfrastructureError::Csv(format!(
                "'{}' is not a .csv file",
                path.display()
            ))
            .into());
        }
        if !path.is_file() {
            return Err(InfrastructureError::Csv(format!("'{}' does not exist", path.display())).into());
        }

        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone()),
        };

        let source = format!("read_csv_auto({})", sql_literal(&path.to_string_lossy()));
        let conn = Connection::open_in_memory()?;

        let columns = {
            let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {source}"))?;
            stmt.query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?
        };
        let row_count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {source}"), [], |row| row.get(0))?;
        let rows = {
            let mut stmt =
                conn.prepare(&format!("SELECT * FROM {source} LIMIT {}", self.preview_rows))?;
            collect_rows(&mut stmt, &[])?
        };

        let record = DatasetRecord {
            id: format!("csv_{}", uuid::Uuid::new_v4()),
            name,
            file_name,
            uploaded_at: Utc::now(),
            preview: DatasetPreview {
                columns,
                row_count: u64::try_from(row_count).unwrap_or_default(),
                rows,
            },
        };

        info!(
            dataset.id = %record.id,
            rows = record.preview.row_count,
            columns = record.preview.columns.len(),
            "CSV ingested"
        );
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_ingest_counts_all_rows_and_keeps_preview() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("people.csv");
        let mut content = String::from("id,name\n");
        for i in 1..=10 {
            if i == 2 {
                content.push_str("2,\n");
            } else {
                content.push_str(&format!("{i},user{i}\n"));
            }
        }
        fs::write(&path, content)?;

        let record = CsvIngestor::default().ingest(&path, None)?;

        assert!(record.id.starts_with("csv_"));
        assert_eq!(record.name, "people");
        assert_eq!(record.file_name, "people.csv");
        assert_eq!(record.preview.columns, vec!["id", "name"]);
        assert_eq!(record.preview.row_count, 10);
        assert_eq!(record.preview.rows.len(), 3);
        assert_eq!(record.preview.rows[0]["id"], json!(1));
        assert_eq!(record.preview.rows[1]["name"], serde_json::Value::Null);
        Ok(())
    }

    #[test]
    fn test_preview_size_is_configurable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("it's.csv");
        fs::write(&path, "a\n1\n2\n3\n4\n5\n")?;

        let record = CsvIngestor::new(10).ingest(&path, Some("numbers"))?;
        assert_eq!(record.name, "numbers");
        assert_eq!(record.preview.rows.len(), 5);
        Ok(())
    }

    #[test]
    fn test_rejects_other_extensions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("people.txt");
        fs::write(&path, "id\n1\n")?;

        let err = CsvIngestor::default().ingest(&path, None).unwrap_err();
        assert!(err.to_string().contains("not a .csv file"));
        Ok(())
    }
}
