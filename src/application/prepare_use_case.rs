// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Turns a raw résumé CSV into the two matrix files:
//
//   Step 1: Load the CSV                (Layer 4 - data)
//   Step 2: Build the stage chain       (Layer 4 - data)
//   Step 3: Run it; the terminal stage
//           writes x_data.npy/y_data.npy (Layer 6 - infra)
//
// The matrices land next to the source CSV unless an output
// directory is given.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    chain::Pipeline,
    loader::CsvLoader,
    stages::{
        BuildMatrices, EncodeCategoricals, NormalizeColumns, ParseCity, ParseExperience,
        ParseGenderAge, ParseSalary,
    },
};
use crate::domain::traits::{MatrixSink, TableSource};
use crate::infra::matrix_store::NpyMatrixStore;

// ─── Prepare Configuration ───────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub table_path:      PathBuf,
    /// Defaults to the directory of `table_path`.
    pub output_dir:      Option<PathBuf>,
    pub with_experience: bool,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            table_path:      PathBuf::from("data/hh.csv"),
            output_dir:      None,
            with_experience: false,
        }
    }
}

impl PrepareConfig {
    /// Where x_data.npy / y_data.npy are written.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => match self.table_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

/// What a prepare run produced.
#[derive(Debug, Clone)]
pub struct PrepareSummary {
    pub n_rows:     usize,
    pub output_dir: PathBuf,
}

/// The chain in its fixed order. ParseExperience runs only when
/// `with_experience` is set.
pub fn build_pipeline(with_experience: bool, sink: Box<dyn MatrixSink>) -> Pipeline {
    Pipeline::builder()
        .then(NormalizeColumns)
        .then(ParseGenderAge)
        .then(ParseSalary)
        .then(ParseCity)
        .then_if(with_experience, ParseExperience)
        .then(EncodeCategoricals::default())
        .then(BuildMatrices::with_defaults(sink))
        .build()
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PrepareSummary> {
        let cfg = &self.config;

        // ── Step 1: Load the table ────────────────────────────────────────────
        tracing::info!("Loading résumé table from '{}'", cfg.table_path.display());
        let table = CsvLoader::new(&cfg.table_path)
            .load_table()
            .with_context(|| format!("Cannot load '{}'", cfg.table_path.display()))?;

        // ── Step 2: Build the chain ───────────────────────────────────────────
        let output_dir = cfg.resolved_output_dir();
        let sink       = NpyMatrixStore::new(&output_dir);
        let mut chain  = build_pipeline(cfg.with_experience, Box::new(sink));
        tracing::debug!("Stage chain: {:?}", chain.stage_names());

        // ── Step 3: Run it ────────────────────────────────────────────────────
        let table = chain.run(table).context("Preparing the feature matrices failed")?;

        Ok(PrepareSummary { n_rows: table.n_rows(), output_dir })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stages::{AGE_COLUMN, EXPERIENCE_COLUMN};
    use crate::domain::error::{PipelineError, PipelineResult};
    use crate::domain::matrix::Matrices;
    use std::cell::RefCell;
    use std::io::Write;
    use std::path::Path;
    use std::rc::Rc;

    /// Keeps every matrix pair it receives.
    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<Matrices>>>);

    impl MatrixSink for Capture {
        fn accept(&mut self, matrices: Matrices) -> PipelineResult<()> {
            self.0.borrow_mut().push(matrices);
            Ok(())
        }
    }

    const HEADER: &str = "Unnamed: 0,\"Пол, возраст\",ЗП,Ищет работу на должность:,Город,\
                          Занятость,График,Опыт (двойное нажатие для полной версии),Авто\n";

    /// 10 résumés: rows 2, 5, 8 have no salary digits, rows 3 and 7 no age.
    fn ten_row_csv() -> String {
        let mut csv = HEADER.to_string();
        for i in 0..10 {
            let gender_age = match i {
                3 | 7 => "Женщина".to_string(),
                _ if i % 2 == 0 => format!("Мужчина , {} лет , родился 1 мая 1990", 20 + i),
                _ => format!("Женщина , {} года , родилась 2 июня 1991", 30 + i),
            };
            let salary = match i {
                2 | 5 | 8 => "з/п не указана".to_string(),
                _ => format!("{} 000 руб.", 40 + i * 5),
            };
            let city = if i % 3 == 0 { "Москва , готов к переезду" } else { "Казань" };
            let auto = if i % 2 == 0 { "Имеется собственный автомобиль" } else { "Не указано" };
            csv.push_str(&format!(
                "{i},\"{gender_age}\",\"{salary}\",Менеджер,\"{city}\",полная занятость,\
                 полный день,\"Опыт работы {i} лет 2 месяца\",{auto}\n"
            ));
        }
        csv
    }

    fn write_table(dir: &Path) -> PathBuf {
        let path     = dir.join("hh.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(ten_row_csv().as_bytes()).unwrap();
        path
    }

    fn run_captured(with_experience: bool) -> Matrices {
        let dir     = tempfile::tempdir().unwrap();
        let table   = CsvLoader::new(write_table(dir.path())).load_table().unwrap();
        let capture = Capture::default();
        build_pipeline(with_experience, Box::new(capture.clone())).run(table).unwrap();
        let mut got = capture.0.borrow_mut();
        assert_eq!(got.len(), 1);
        got.remove(0)
    }

    #[test]
    fn test_end_to_end_sentinels() {
        let m = run_captured(false);
        assert_eq!(m.n_rows(), 10);
        assert_eq!(m.target().len(), 10);
        assert_eq!(m.target().iter().filter(|&&s| s == 0.0).count(), 3);

        let age = m.feature_names().iter().position(|n| n == AGE_COLUMN).unwrap();
        assert_eq!(m.features().column(age).iter().filter(|&&a| a == -1.0).count(), 2);
        assert!(!m.feature_names().iter().any(|n| n == "зп" || n == "salary"));
    }

    #[test]
    fn test_same_table_same_matrices() {
        assert_eq!(run_captured(false), run_captured(false));
    }

    #[test]
    fn test_experience_stage_is_optional() {
        let without = run_captured(false);
        let with    = run_captured(true);
        assert!(!without.feature_names().iter().any(|n| n == EXPERIENCE_COLUMN));
        let idx = with.feature_names().iter().position(|n| n == EXPERIENCE_COLUMN).unwrap();
        // "Опыт работы 4 лет 2 месяца"
        assert!((with.features()[[4, idx]] - (4.0 + 2.0 / 12.0)).abs() < 1e-5);
        assert_eq!(with.n_features(), without.n_features() + 1);
    }

    #[test]
    fn test_execute_writes_npy_files() {
        let dir     = tempfile::tempdir().unwrap();
        let out     = dir.path().join("matrices");
        let summary = PrepareUseCase::new(PrepareConfig {
            table_path:      write_table(dir.path()),
            output_dir:      Some(out.clone()),
            with_experience: false,
        })
        .execute()
        .unwrap();
        assert_eq!(summary.n_rows, 10);

        let m = NpyMatrixStore::new(&out).read().unwrap();
        assert_eq!(m.n_rows(), 10);
        assert_eq!(m.target().iter().filter(|&&s| s == 0.0).count(), 3);
    }

    #[test]
    fn test_missing_column_stops_the_run() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "ЗП,Город\n10 000,Омск\n").unwrap();

        let err = PrepareUseCase::new(PrepareConfig { table_path: path, ..PrepareConfig::default() })
            .execute()
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::MissingInput(_))));
        assert!(!dir.path().join("x_data.npy").exists());
    }

    #[test]
    fn test_default_output_dir_is_table_dir() {
        let cfg = PrepareConfig { table_path: PathBuf::from("data/hh.csv"), ..PrepareConfig::default() };
        assert_eq!(cfg.resolved_output_dir(), PathBuf::from("data"));
        let cfg = PrepareConfig { table_path: PathBuf::from("hh.csv"), ..PrepareConfig::default() };
        assert_eq!(cfg.resolved_output_dir(), PathBuf::from("."));
    }
}
