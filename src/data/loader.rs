// ============================================================
// Layer 4 — Table Loader
// ============================================================
// Loads a résumé export (UTF-8 CSV with a header row) into a
// RecordTable using the csv crate.
//
// Tolerance policy:
//   - A record the reader rejects (wrong number of fields,
//     invalid UTF-8) is skipped with a warning. One broken line
//     in a 40k-row export must not lose the other 39 999.
//   - A missing file or an unreadable header is fatal.
//
// After loading, each column gets a semantic type:
//
//   every cell a non-empty integer → Int
//   every cell a non-empty number  → Float
//   anything else                  → Text
//
// Columns with blanks stay Text, so a half-filled numeric column
// never leaks NaN into the feature matrix.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::path::PathBuf;

use csv::ReaderBuilder;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::table::{Column, ColumnData, RecordTable};
use crate::domain::traits::TableSource;

/// Loads a comma-separated file into a RecordTable.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvLoader {
    fn load_table(&self) -> PipelineResult<RecordTable> {
        if !self.path.is_file() {
            return Err(PipelineError::MissingInput(format!(
                "table file '{}' not found",
                self.path.display()
            )));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|e| PipelineError::MissingInput(format!(
                "cannot open '{}': {e}",
                self.path.display()
            )))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PipelineError::Format(format!(
                "cannot read header of '{}': {e}",
                self.path.display()
            )))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut skipped = 0usize;

        for result in reader.records() {
            match result {
                Ok(record) => {
                    for (column, value) in cells.iter_mut().zip(record.iter()) {
                        column.push(value.to_string());
                    }
                }
                // I/O errors are not row-local; stop instead of spinning
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(PipelineError::Format(format!(
                        "I/O error while reading '{}': {e}",
                        self.path.display()
                    )));
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping malformed row: {}", e);
                }
            }
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name, infer_column(values)))
            .collect();

        let table = RecordTable::from_columns(columns)?;
        for column in table.columns() {
            tracing::debug!("Column '{}': {}", column.name, column.data.kind());
        }
        let numeric = table.columns().iter().filter(|c| c.data.is_numeric()).count();
        tracing::info!(
            "Loaded {} rows x {} columns ({} numeric) from '{}' ({} malformed rows skipped)",
            table.n_rows(),
            table.n_columns(),
            numeric,
            self.path.display(),
            skipped
        );
        Ok(table)
    }
}

/// Pick the narrowest semantic type every cell fits.
fn infer_column(values: Vec<String>) -> ColumnData {
    if values.is_empty() {
        return ColumnData::Text(values);
    }

    let ints: Option<Vec<i64>> = values.iter().map(|v| v.trim().parse().ok()).collect();
    if let Some(ints) = ints {
        return ColumnData::Int(ints);
    }

    let floats: Option<Vec<f64>> = values
        .iter()
        .map(|v| v.trim().parse::<f64>().ok().filter(|f| f.is_finite()))
        .collect();
    if let Some(floats) = floats {
        return ColumnData::Float(floats);
    }

    ColumnData::Text(values)
}
