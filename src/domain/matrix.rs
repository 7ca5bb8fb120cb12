// ============================================================
// Layer 3 — Feature Matrix / Target Vector
// ============================================================
// The numeric output of the stage chain and the input of the
// trainer and predictor.
//
//   features: [n_rows, n_features]  f32
//   target:   [n_rows]              f32
//
// Row i of `features` belongs to element i of `target`. The
// pair is only ever built through Matrices::new, which refuses
// a misaligned pair, and neither half is reordered on its own.

use ndarray::{Array1, Array2};

use crate::domain::error::{PipelineError, PipelineResult};

pub type FeatureMatrix = Array2<f32>;
pub type TargetVector  = Array1<f32>;

/// A row-aligned feature matrix and target vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrices {
    features:      FeatureMatrix,
    target:        TargetVector,
    feature_names: Vec<String>,
}

impl Matrices {
    pub fn new(
        features:      FeatureMatrix,
        target:        TargetVector,
        feature_names: Vec<String>,
    ) -> PipelineResult<Self> {
        if features.nrows() != target.len() {
            return Err(PipelineError::Format(format!(
                "feature matrix has {} rows but target vector has {} values",
                features.nrows(),
                target.len()
            )));
        }
        if !feature_names.is_empty() && feature_names.len() != features.ncols() {
            return Err(PipelineError::Format(format!(
                "{} feature names given for {} feature columns",
                feature_names.len(),
                features.ncols()
            )));
        }
        Ok(Self { features, target, feature_names })
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn target(&self) -> &TargetVector {
        &self.target
    }

    /// Column names in matrix order. Empty for matrices read back from disk.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn into_parts(self) -> (FeatureMatrix, TargetVector) {
        (self.features, self.target)
    }
}

/// Fail with a Format error if any value is NaN or infinite.
pub fn ensure_finite<'a>(what: &str, values: impl IntoIterator<Item = &'a f32>) -> PipelineResult<()> {
    match values.into_iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(PipelineError::Format(format!(
            "{what} contains a non-finite value at flat index {idx}"
        ))),
        None => Ok(()),
    }
}
