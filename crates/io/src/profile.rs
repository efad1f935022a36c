use serde::Serialize;

use mdmerge_recon::model::{Record, Table};

/// Shape of a loaded table plus its first few rows, for previews.
#[derive(Debug, Clone, Serialize)]
pub struct TableProfile {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    /// Columns whose every value is empty.
    pub empty_columns: Vec<String>,
    pub preview: Vec<Record>,
}

impl TableProfile {
    pub fn new(table: &Table, preview_rows: usize) -> Self {
        let empty_columns = table
            .columns
            .iter()
            .filter(|c| table.records.iter().all(|r| r.value(c).trim().is_empty()))
            .cloned()
            .collect();

        Self {
            row_count: table.len(),
            column_count: table.columns.len(),
            columns: table.columns.clone(),
            empty_columns,
            preview: table.records.iter().take(preview_rows).cloned().collect(),
        }
    }
}
