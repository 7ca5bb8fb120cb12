// ============================================================
// Layer 4 — Transformation Stages
// ============================================================
// The concrete links of the processing chain, in the order the
// default chain runs them:
//
//   1. NormalizeColumns    "Пол, возраст" → "пол_возраст"
//   2. ParseGenderAge      пол_возраст    → gender, age
//   3. ParseSalary         зп             → salary
//   4. ParseCity           город          → city
//   (4b. ParseExperience   опыт…          → experience_years,
//                          only with --with-experience)
//   5. EncodeCategoricals  text categories → integer codes
//   6. BuildMatrices       table → x / y matrices → sink
//
// Every stage takes the table by value and hands it back. A
// stage whose source column is absent returns MissingInput and
// the chain stops there; bad cell content never fails, the
// parsers in parsers.rs fall back to sentinels instead.
//
// Reference: Rust Book §17 (Trait Objects)

use ndarray::{Array1, Array2};

use crate::data::encoder::CategoryEncoder;
use crate::data::parsers;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::matrix::Matrices;
use crate::domain::table::{ColumnData, RecordTable};
use crate::domain::traits::{MatrixSink, Stage};

// ─── Column names (after normalisation) ──────────────────────────────────────
pub const GENDER_AGE_COLUMN:    &str = "пол_возраст";
pub const SALARY_SOURCE_COLUMN: &str = "зп";
pub const CITY_SOURCE_COLUMN:   &str = "город";
pub const EXPERIENCE_HINT:      &str = "опыт";

pub const GENDER_COLUMN:     &str = "gender";
pub const AGE_COLUMN:        &str = "age";
pub const SALARY_COLUMN:     &str = "salary";
pub const CITY_COLUMN:       &str = "city";
pub const EXPERIENCE_COLUMN: &str = "experience_years";

/// Columns encoded by EncodeCategoricals when present.
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "ищет_работу_на_должность:",
    "занятость",
    "график",
    CITY_COLUMN,
    "авто",
];

/// Apply a field parser to every cell of a required column.
fn parse_column<T>(
    table:  &RecordTable,
    stage:  &str,
    column: &str,
    parse:  impl Fn(&str) -> T,
) -> PipelineResult<Vec<T>> {
    let source = table.require(stage, column)?;
    Ok(source.data.texts().iter().map(|cell| parse(&**cell)).collect())
}

// ─── 1. NormalizeColumns ──────────────────────────────────────────────────────
pub struct NormalizeColumns;

impl Stage for NormalizeColumns {
    fn name(&self) -> &'static str {
        "normalize_columns"
    }

    fn process(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
        table.rename_columns(parsers::normalize_column_name);
        tracing::debug!("Normalised columns: {:?}", table.column_names());
        Ok(table)
    }
}

// ─── 2. ParseGenderAge ────────────────────────────────────────────────────────
pub struct ParseGenderAge;

impl Stage for ParseGenderAge {
    fn name(&self) -> &'static str {
        "parse_gender_age"
    }

    fn process(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
        let gender = parse_column(&table, self.name(), GENDER_AGE_COLUMN, parsers::parse_gender)?;
        let age    = parse_column(&table, self.name(), GENDER_AGE_COLUMN, parsers::parse_age)?;

        let unparsed = age.iter().filter(|&&a| a < 0).count();
        if unparsed > 0 {
            tracing::debug!("{} rows without a recognisable age (set to -1)", unparsed);
        }

        table.set_column(GENDER_COLUMN, ColumnData::Int(gender))?;
        table.set_column(AGE_COLUMN,    ColumnData::Int(age))?;
        table.drop_column(GENDER_AGE_COLUMN);
        Ok(table)
    }
}

// ─── 3. ParseSalary ───────────────────────────────────────────────────────────
/// Adds `salary`. The raw `зп` column stays; BuildMatrices
/// excludes it from the features.
pub struct ParseSalary;

impl Stage for ParseSalary {
    fn name(&self) -> &'static str {
        "parse_salary"
    }

    fn process(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
        let salary = parse_column(&table, self.name(), SALARY_SOURCE_COLUMN, parsers::parse_salary)?;

        let unparsed = salary.iter().filter(|&&s| s == 0).count();
        if unparsed > 0 {
            tracing::debug!("{} rows without salary digits (set to 0)", unparsed);
        }

        table.set_column(SALARY_COLUMN, ColumnData::Int(salary))?;
        Ok(table)
    }
}

// ─── 4. ParseCity ─────────────────────────────────────────────────────────────
pub struct ParseCity;

impl Stage for ParseCity {
    fn name(&self) -> &'static str {
        "parse_city"
    }

    fn process(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
        let city = parse_column(&table, self.name(), CITY_SOURCE_COLUMN, parsers::parse_city)?;
        table.set_column(CITY_COLUMN, ColumnData::Text(city))?;
        table.drop_column(CITY_SOURCE_COLUMN);
        Ok(table)
    }
}

// ─── 4b. ParseExperience ──────────────────────────────────────────────────────
/// Adds `experience_years` from the first column whose name
/// contains "опыт". The source column is kept; it is text and
/// never reaches the matrix.
pub struct ParseExperience;

impl Stage for ParseExperience {
    fn name(&self) -> &'static str {
        "parse_experience"
    }

    fn process(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
        let source = table
            .column_names()
            .into_iter()
            .find(|n| n.contains(EXPERIENCE_HINT))
            .map(str::to_string)
            .ok_or_else(|| PipelineError::missing_column(self.name(), EXPERIENCE_HINT))?;

        let years = parse_column(&table, self.name(), &source, parsers::parse_experience_years)?;
        table.set_column(EXPERIENCE_COLUMN, ColumnData::Float(years))?;
        Ok(table)
    }
}

// ─── 5. EncodeCategoricals ────────────────────────────────────────────────────
/// Encodes each declared column that is present; absent ones
/// are skipped. A fresh CategoryEncoder is created per run.
pub struct EncodeCategoricals {
    columns: Vec<String>,
    encoder: CategoryEncoder,
}

impl EncodeCategoricals {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            encoder: CategoryEncoder::new(),
        }
    }
}

impl Default for EncodeCategoricals {
    fn default() -> Self {
        Self::new(CATEGORICAL_COLUMNS)
    }
}

impl Stage for EncodeCategoricals {
    fn name(&self) -> &'static str {
        "encode_categoricals"
    }

    fn process(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
        self.encoder = CategoryEncoder::new();

        for name in &self.columns {
            let encoded = match table.column(name) {
                Some(column) => self.encoder.encode_column(name, &column.data),
                None => {
                    tracing::debug!("Categorical column '{}' not present, skipping", name);
                    continue;
                }
            };
            table.set_column(name.as_str(), encoded)?;
            if let Some(map) = self.encoder.map_for(name) {
                tracing::debug!("Encoded column '{}' into {} categories", name, map.len());
            }
        }

        let encoded: Vec<&str> = self.encoder.encoded_columns().collect();
        tracing::info!("Encoded {} categorical columns: {:?}", encoded.len(), encoded);
        Ok(table)
    }
}

// ─── 6. BuildMatrices ─────────────────────────────────────────────────────────
/// Terminal stage: builds the matrices, hands them to the sink,
/// and returns the table untouched.
pub struct BuildMatrices {
    target:  String,
    exclude: Vec<String>,
    sink:    Box<dyn MatrixSink>,
}

impl BuildMatrices {
    pub fn new(target: impl Into<String>, exclude: &[&str], sink: Box<dyn MatrixSink>) -> Self {
        Self {
            target:  target.into(),
            exclude: exclude.iter().map(|c| c.to_string()).collect(),
            sink,
        }
    }

    /// Target `salary`, raw `зп` excluded.
    pub fn with_defaults(sink: Box<dyn MatrixSink>) -> Self {
        Self::new(SALARY_COLUMN, &[SALARY_SOURCE_COLUMN], sink)
    }
}

impl Stage for BuildMatrices {
    fn name(&self) -> &'static str {
        "build_matrices"
    }

    fn process(&mut self, table: RecordTable) -> PipelineResult<RecordTable> {
        let exclude: Vec<&str> = self.exclude.iter().map(String::as_str).collect();
        let matrices           = extract_matrices(&table, &self.target, &exclude)?;

        tracing::info!(
            "Built feature matrix {}x{} ({:?}) and target vector of {}",
            matrices.n_rows(),
            matrices.n_features(),
            matrices.feature_names(),
            matrices.target().len(),
        );

        self.sink.accept(matrices)?;
        Ok(table)
    }
}

/// Split a processed table into features and target.
///
/// Features are every numeric column except the target and the
/// excluded ones, in table order. Text columns are left out.
pub fn extract_matrices(
    table:   &RecordTable,
    target:  &str,
    exclude: &[&str],
) -> PipelineResult<Matrices> {
    let target_column = table.require("build_matrices", target)?;
    let target_values = target_column.data.to_f32().ok_or_else(|| {
        PipelineError::Format(format!("target column '{target}' is not numeric"))
    })?;

    let mut names   = Vec::new();
    let mut columns = Vec::new();
    for column in table.columns() {
        if column.name == target || exclude.contains(&column.name.as_str()) {
            continue;
        }
        match column.data.to_f32() {
            Some(values) => {
                names.push(column.name.clone());
                columns.push(values);
            }
            None => tracing::debug!("Dropping non-numeric column '{}'", column.name),
        }
    }

    let n_rows   = table.n_rows();
    let features = Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| columns[j][i]);
    Matrices::new(features, Array1::from(target_values), names)
}
