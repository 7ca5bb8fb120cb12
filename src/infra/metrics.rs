// ============================================================
// Layer 6 — Regression Metrics
// ============================================================
// Scores a set of salary predictions and records the scores to
// a CSV file, one row per evaluated split.
//
// Metrics recorded per split:
//   - n:    number of rows scored
//   - mae:  mean absolute error       (same unit as salary)
//   - mse:  mean squared error
//   - rmse: square root of mse        (same unit as salary)
//   - r2:   coefficient of determination, 1.0 is a perfect fit
//
// Output file: <artifact_dir>/metrics.csv
//
// Example CSV output:
//   run,split,n,mae,mse,rmse,r2
//   1760870400,validation,2000,21034.512000,…,0.412000
//   1760870400,train,8000,18211.004000,…,0.488000
//
// How to read the metrics:
//   - validation r2 well below train r2 → overfitting
//   - r2 near 0 → the model is no better than predicting the mean
//
// Reference: Rust Book §12 (I/O and File Handling)

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};

const CSV_HEADER: &str = "run,split,n,mae,mse,rmse,r2";

/// Scores of one prediction set against its ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub n:    usize,
    pub mae:  f64,
    pub mse:  f64,
    pub rmse: f64,
    /// 0.0 when the ground truth has no variance.
    pub r2:   f64,
}

impl RegressionMetrics {
    /// Score `predicted` against `actual`. None when there is
    /// nothing to score or the lengths differ.
    pub fn compute(actual: &[f32], predicted: &[f32]) -> Option<Self> {
        if actual.is_empty() || actual.len() != predicted.len() {
            return None;
        }

        let n    = actual.len() as f64;
        let mean = actual.iter().map(|&v| v as f64).sum::<f64>() / n;

        let mut abs_sum = 0.0;
        let mut sq_sum  = 0.0;
        let mut tot_sum = 0.0;
        for (&a, &p) in actual.iter().zip(predicted) {
            let err  = a as f64 - p as f64;
            abs_sum += err.abs();
            sq_sum  += err * err;
            tot_sum += (a as f64 - mean).powi(2);
        }

        let mse = sq_sum / n;
        let r2  = if tot_sum > 0.0 { 1.0 - sq_sum / tot_sum } else { 0.0 };

        Some(Self {
            n:    actual.len(),
            mae:  abs_sum / n,
            mse,
            rmse: mse.sqrt(),
            r2,
        })
    }
}

/// Appends metric rows to `metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and the CSV header if they do not
    /// exist yet. Existing rows from earlier runs are kept.
    pub fn new(dir: impl AsRef<Path>) -> PipelineResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PipelineError::storage(dir, e))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            fs::write(&csv_path, format!("{CSV_HEADER}\n"))
                .map_err(|e| PipelineError::storage(&csv_path, e))?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row for `split` of training run `run`.
    pub fn log(&self, run: u64, split: &str, m: &RegressionMetrics) -> PipelineResult<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| PipelineError::storage(&self.csv_path, e))?;

        writeln!(
            f,
            "{},{},{},{:.6},{:.6},{:.6},{:.6}",
            run, split, m.n, m.mae, m.mse, m.rmse, m.r2,
        )
        .map_err(|e| PipelineError::storage(&self.csv_path, e))?;

        tracing::debug!("Logged {} metrics for run {}", split, run);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let m = RegressionMetrics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert!((m.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_errors() {
        // errors: 1, -1, 2 → mae 4/3, mse 2
        let m = RegressionMetrics::compute(&[2.0, 4.0, 6.0], &[1.0, 5.0, 4.0]).unwrap();
        assert!((m.mae - 4.0 / 3.0).abs() < 1e-9);
        assert!((m.mse - 2.0).abs() < 1e-9);
        assert!((m.rmse - 2.0f64.sqrt()).abs() < 1e-9);
        // total sum of squares = 8 → r2 = 1 - 6/8
        assert!((m.r2 - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_constant_target_has_zero_r2() {
        let m = RegressionMetrics::compute(&[5.0, 5.0], &[4.0, 6.0]).unwrap();
        assert_eq!(m.r2, 0.0);
    }

    #[test]
    fn test_nothing_to_score() {
        assert!(RegressionMetrics::compute(&[], &[]).is_none());
        assert!(RegressionMetrics::compute(&[1.0], &[]).is_none());
    }

    #[test]
    fn test_logger_appends_rows_after_header() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        let m      = RegressionMetrics::compute(&[1.0, 2.0], &[1.0, 3.0]).unwrap();
        logger.log(7, "validation", &m).unwrap();

        // A second logger on the same directory keeps the old rows
        MetricsLogger::new(dir.path()).unwrap().log(8, "train", &m).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("7,validation,2,"));
        assert!(lines[2].starts_with("8,train,2,"));
    }
}
