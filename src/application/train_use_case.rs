// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Read x_data.npy / y_data.npy   (Layer 6 - infra)
//   Step 2: Validate the matrices          (Layer 3 - domain)
//   Step 3: Seeded train/test split        (Layer 4 - data)
//   Step 4: Fit on the train rows, score
//           train and test rows            (Layer 5 - ml)
//   Step 5: Refit on every row             (Layer 5 - ml)
//   Step 6: Save artifact + config         (Layer 6 - infra)
//
// The saved artifact is always the full-data fit; the split
// only exists to report how well the model generalises.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::data::splitter::split_train_val;
use crate::domain::error::PipelineError;
use crate::domain::matrix::{ensure_finite, FeatureMatrix, Matrices, TargetVector};
use crate::domain::traits::{Estimator, TrainedModel};
use crate::infra::{
    artifact_store::ArtifactStore,
    matrix_store::NpyMatrixStore,
    metrics::{MetricsLogger, RegressionMetrics},
};
use crate::ml::trainer::{MlpParams, MlpRegressor};

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialisable so it can be saved next to the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Directory holding x_data.npy and y_data.npy
    pub data_dir:       PathBuf,
    pub artifact_dir:   PathBuf,
    pub train_fraction: f64,
    pub model:          MlpParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       PathBuf::from("data"),
            artifact_dir:   PathBuf::from("resources"),
            train_fraction: 0.8,
            model:          MlpParams::default(),
        }
    }
}

/// Scores of the evaluation fit and where the final model went.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub train:         Option<RegressionMetrics>,
    pub test:          Option<RegressionMetrics>,
    pub artifact_path: PathBuf,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Read the matrices ─────────────────────────────────────────
        let matrices = NpyMatrixStore::new(&cfg.data_dir)
            .read()
            .with_context(|| format!("Cannot read training matrices from '{}'", cfg.data_dir.display()))?;

        // ── Step 2: Validate before any fitting ───────────────────────────────
        validate(&matrices)?;
        let (x, y) = matrices.into_parts();

        // ── Step 3: Train / test split ────────────────────────────────────────
        let rows: Vec<usize>       = (0..x.nrows()).collect();
        let (train_idx, test_idx) = split_train_val(rows, cfg.train_fraction, cfg.model.seed);
        tracing::info!("Split: {} train, {} test", train_idx.len(), test_idx.len());

        // ── Step 4: Evaluation fit ────────────────────────────────────────────
        let estimator = MlpRegressor::new(cfg.model.clone());
        let logger    = MetricsLogger::new(&cfg.artifact_dir)?;
        tracing::debug!("Appending metrics to '{}'", logger.csv_path().display());
        let run_id    = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);

        let (train, test) = if train_idx.is_empty() {
            tracing::warn!("No training rows after the split; skipping evaluation");
            (None, None)
        } else {
            let (x_train, y_train) = select_rows(&x, &y, &train_idx);
            let model = estimator.fit(&x_train, &y_train).context("Evaluation fit failed")?;

            let train = score(&model, &x_train, &y_train, "train", run_id, &logger)?;
            let test  = if test_idx.is_empty() {
                tracing::warn!("No test rows after the split; skipping test metrics");
                None
            } else {
                let (x_test, y_test) = select_rows(&x, &y, &test_idx);
                score(&model, &x_test, &y_test, "test", run_id, &logger)?
            };
            (train, test)
        };

        // ── Step 5: Refit on all rows ─────────────────────────────────────────
        tracing::info!("Refitting on all {} rows", x.nrows());
        let final_model = estimator.fit(&x, &y).context("Final fit failed")?;

        // ── Step 6: Save artifact + config ────────────────────────────────────
        let store         = ArtifactStore::new(&cfg.artifact_dir);
        let artifact_path = store.save(&final_model)?;
        store.save_config(cfg)?;

        Ok(TrainReport { train, test, artifact_path })
    }
}

/// Refuse matrices the estimator cannot meaningfully fit.
fn validate(matrices: &Matrices) -> Result<(), PipelineError> {
    if matrices.n_rows() == 0 {
        return Err(PipelineError::Format("the training matrices have no rows".to_string()));
    }
    if matrices.n_features() == 0 {
        return Err(PipelineError::Format("the feature matrix has no columns".to_string()));
    }
    ensure_finite("x_data", matrices.features().iter())?;
    ensure_finite("y_data", matrices.target().iter())?;
    Ok(())
}

fn select_rows(x: &FeatureMatrix, y: &TargetVector, idx: &[usize]) -> (FeatureMatrix, TargetVector) {
    (x.select(Axis(0), idx), y.select(Axis(0), idx))
}

/// Predict `x`, score against `y`, log and record the result.
fn score(
    model:  &impl TrainedModel,
    x:      &FeatureMatrix,
    y:      &TargetVector,
    split:  &str,
    run_id: u64,
    logger: &MetricsLogger,
) -> Result<Option<RegressionMetrics>> {
    let predicted = model.predict(x)?;
    let actual    = y.to_vec();
    let metrics   = RegressionMetrics::compute(&actual, &predicted);

    if let Some(m) = &metrics {
        tracing::info!(
            "{:<5} | n={} | mae={:.2} | rmse={:.2} | r2={:.4}",
            split, m.n, m.mae, m.rmse, m.r2
        );
        logger.log(run_id, split, m)?;
    }
    Ok(metrics)
}
