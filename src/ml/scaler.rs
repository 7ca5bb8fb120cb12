// ============================================================
// Layer 5 — Standard Scaling
// ============================================================
// Centres each feature column on 0 with unit variance before
// it reaches the network, and does the same for the target:
//
//   z = (x - mean) / std
//
// Salary values are in the tens of thousands while gender is
// 0/1; without scaling the large columns would dominate the
// first gradient steps.
//
// A column with zero variance (every résumé has the same value)
// gets std = 1.0, so it maps to all zeros instead of NaN.
//
// The fitted statistics travel inside the model artifact, so
// `predict` applies exactly the scaling `train` used.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::domain::matrix::FeatureMatrix;

/// Per-column mean and standard deviation of a feature matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f32>,
    stds:  Vec<f32>,
}

impl StandardScaler {
    pub fn fit(features: &FeatureMatrix) -> Self {
        let mut means = Vec::with_capacity(features.ncols());
        let mut stds  = Vec::with_capacity(features.ncols());

        for column in features.axis_iter(Axis(1)) {
            let (mean, std) = mean_std(column.iter().copied());
            means.push(mean);
            stds.push(std);
        }
        Self { means, stds }
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Caller guarantees `features.ncols() == self.n_features()`.
    pub fn transform(&self, features: &FeatureMatrix) -> Array2<f32> {
        let mut out = features.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (mean, std) = (self.means[j], self.stds[j]);
            column.mapv_inplace(|v| (v - mean) / std);
        }
        out
    }
}

/// Mean and standard deviation of the target vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetScaler {
    mean: f32,
    std:  f32,
}

impl TargetScaler {
    pub fn fit(target: &[f32]) -> Self {
        let (mean, std) = mean_std(target.iter().copied());
        Self { mean, std }
    }

    pub fn transform(&self, value: f32) -> f32 {
        (value - self.mean) / self.std
    }

    pub fn inverse(&self, value: f32) -> f32 {
        value * self.std + self.mean
    }
}

/// Population mean and std, accumulated in f64. A zero or
/// non-finite std becomes 1.0.
fn mean_std(values: impl Iterator<Item = f32> + Clone) -> (f32, f32) {
    let (count, sum) = values.clone().fold((0usize, 0.0f64), |(n, s), v| (n + 1, s + v as f64));
    if count == 0 {
        return (0.0, 1.0);
    }
    let mean = sum / count as f64;
    let var  = values.map(|v| (v as f64 - mean).powi(2)).sum::<f64>() / count as f64;
    let std  = var.sqrt();

    let std = if std > f64::EPSILON && std.is_finite() { std } else { 1.0 };
    (mean as f32, std as f32)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_columns_centred_and_scaled() {
        let x      = array![[1.0f32, 10.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(&x);
        let z      = scaler.transform(&x);
        assert_eq!(z, array![[-1.0f32, -1.0], [1.0, 1.0]]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x      = array![[5.0f32], [5.0], [5.0]];
        let scaler = StandardScaler::fit(&x);
        assert_eq!(scaler.transform(&x), array![[0.0f32], [0.0], [0.0]]);
    }

    #[test]
    fn test_target_inverse() {
        let t = TargetScaler::fit(&[100.0, 200.0, 300.0]);
        assert!((t.transform(200.0)).abs() < 1e-6);
        assert!((t.inverse(t.transform(300.0)) - 300.0).abs() < 1e-3);
    }
}
