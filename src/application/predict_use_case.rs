// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Predicts one salary per row of a prepared feature matrix:
//
//   Step 1: Read the feature matrix and
//           refuse NaN / infinite cells    (Layer 6 - infra)
//   Step 2: Load the model artifact        (Layer 6 - infra)
//   Step 3: Check the column count against
//           the count the model declares   (Layer 3 - domain)
//   Step 4: Predict                        (Layer 5 - ml)
//
// The column check runs here, before any arithmetic, so a matrix
// from a different `prepare` configuration fails with a message
// naming both counts instead of producing nonsense numbers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::error::PipelineError;
use crate::domain::matrix::ensure_finite;
use crate::infra::{artifact_store::ArtifactStore, matrix_store::read_feature_matrix};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    pub features_path: PathBuf,
    pub artifact_dir:  PathBuf,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            features_path: PathBuf::from("data/x_data.npy"),
            artifact_dir:  PathBuf::from("resources"),
        }
    }
}

pub struct PredictUseCase {
    config: PredictConfig,
}

impl PredictUseCase {
    pub fn new(config: PredictConfig) -> Self {
        Self { config }
    }

    /// One prediction per input row, in row order.
    pub fn execute(&self) -> Result<Vec<f32>> {
        let cfg = &self.config;

        // ── Step 1: Features ──────────────────────────────────────────────────
        let features = read_feature_matrix(&cfg.features_path)
            .with_context(|| format!("Cannot read features from '{}'", cfg.features_path.display()))?;
        ensure_finite("x_data", features.iter())?;

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let model = ArtifactStore::new(&cfg.artifact_dir).load()?;

        // ── Step 3: Schema check ──────────────────────────────────────────────
        let expected = model.n_features_in();
        let actual   = features.ncols();
        if expected != actual {
            return Err(PipelineError::SchemaMismatch { expected, actual }.into());
        }

        if features.nrows() == 0 {
            tracing::warn!("Feature matrix has no rows; nothing to predict");
            return Ok(Vec::new());
        }

        // ── Step 4: Predict ───────────────────────────────────────────────────
        let predictions = model.predict(&features)?;
        tracing::info!("Predicted {} salaries", predictions.len());
        Ok(predictions)
    }
}
