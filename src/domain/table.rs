// ============================================================
// Layer 3 — Record Table
// ============================================================
// The in-memory table that flows through the stage chain.
//
// Stored column-major: each Column owns one typed vector, so a
// column can never mix semantic types. A cell's row index is
// its position in that vector.
//
//   ┌──────────────┬──────────┬─────────┐
//   │ пол_возраст  │ зп       │ город   │   ← Text columns
//   ├──────────────┼──────────┼─────────┤
//   │ "Мужчина…"   │ "30 000" │ "Москва"│   row 0
//   │ …            │ …        │ …       │   row 1..n
//   └──────────────┴──────────┴─────────┘
//
// Row count is fixed when the table is created. set_column()
// refuses vectors of any other length, which is how the
// "stages never change the row count" rule is kept.
//
// Reference: Rust Book §8 (Vectors), §6 (Enums)

use std::borrow::Cow;

use crate::domain::error::{PipelineError, PipelineResult};

/// Values of one column. Every variant except `Text` is numeric
/// and can reach the feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<String>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Category(Vec<u32>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v)     => v.len(),
            ColumnData::Int(v)      => v.len(),
            ColumnData::Float(v)    => v.len(),
            ColumnData::Category(v) => v.len(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnData::Text(_))
    }

    /// Short type name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Text(_)     => "text",
            ColumnData::Int(_)      => "int",
            ColumnData::Float(_)    => "float",
            ColumnData::Category(_) => "category",
        }
    }

    /// Text view of every cell. Text cells are borrowed,
    /// numeric cells are formatted.
    pub fn texts(&self) -> Vec<Cow<'_, str>> {
        match self {
            ColumnData::Text(v)     => v.iter().map(|s| Cow::Borrowed(s.as_str())).collect(),
            ColumnData::Int(v)      => v.iter().map(|x| Cow::Owned(x.to_string())).collect(),
            ColumnData::Float(v)    => v.iter().map(|x| Cow::Owned(x.to_string())).collect(),
            ColumnData::Category(v) => v.iter().map(|x| Cow::Owned(x.to_string())).collect(),
        }
    }

    /// Numeric values as f32, or None for a text column.
    pub fn to_f32(&self) -> Option<Vec<f32>> {
        match self {
            ColumnData::Text(_)     => None,
            ColumnData::Int(v)      => Some(v.iter().map(|&x| x as f32).collect()),
            ColumnData::Float(v)    => Some(v.iter().map(|&x| x as f32).collect()),
            ColumnData::Category(v) => Some(v.iter().map(|&x| x as f32).collect()),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self { name: name.into(), data }
    }
}

/// Ordered collection of equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    columns: Vec<Column>,
    n_rows:  usize,
}

impl RecordTable {
    /// Build a table, checking that every column has the same length.
    pub fn from_columns(columns: Vec<Column>) -> PipelineResult<Self> {
        let n_rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.data.len() != n_rows) {
            return Err(PipelineError::Format(format!(
                "column '{}' has {} values but the table has {} rows",
                bad.name,
                bad.data.len(),
                n_rows
            )));
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column a stage cannot run without.
    pub fn require(&self, stage: &str, name: &str) -> PipelineResult<&Column> {
        self.column(name)
            .ok_or_else(|| PipelineError::missing_column(stage, name))
    }

    /// Insert or replace a column. A replaced column keeps its position;
    /// a new one is appended at the end.
    pub fn set_column(&mut self, name: impl Into<String>, data: ColumnData) -> PipelineResult<()> {
        let name = name.into();
        if data.len() != self.n_rows {
            return Err(PipelineError::Format(format!(
                "column '{}' has {} values but the table has {} rows",
                name,
                data.len(),
                self.n_rows
            )));
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.data = data,
            None           => self.columns.push(Column::new(name, data)),
        }
        Ok(())
    }

    /// Remove a column, returning it if it was present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx))
    }

    /// Rewrite every column name with `f`, keeping order and data.
    pub fn rename_columns(&mut self, mut f: impl FnMut(&str) -> String) {
        for column in &mut self.columns {
            column.name = f(&column.name);
        }
    }
}
