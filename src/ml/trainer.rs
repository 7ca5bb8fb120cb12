// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fits a SalaryRegressor on a feature matrix with Adam and
// seeded minibatches.
//
//   1. Fit StandardScaler on x and TargetScaler on y
//   2. Build the network from StdRng::seed_from_u64(seed)
//   3. For each epoch: shuffle row order with the same RNG,
//      walk it in batch_size chunks, MSE loss, Adam step
//   4. model.valid() → the inference-backend model
//
// Key Burn 0.20 insight:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InferBackend (NdArray)
//
// A non-finite loss aborts the fit with a Training error rather
// than producing an artifact full of NaN weights.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use burn::{
    backend::ndarray::NdArrayDevice,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::TensorData,
};
use ndarray::Array2;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::matrix::{FeatureMatrix, TargetVector};
use crate::domain::traits::Estimator;
use crate::ml::inferencer::FittedRegressor;
use crate::ml::model::{SalaryRegressor, SalaryRegressorConfig};
use crate::ml::scaler::{StandardScaler, TargetScaler};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
pub type InferBackend = burn::backend::NdArray;

/// Hyperparameters of the MLP estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpParams {
    pub hidden:     usize,
    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,
    pub seed:       u64,
}

impl Default for MlpParams {
    fn default() -> Self {
        Self {
            hidden:     32,
            epochs:     200,
            batch_size: 64,
            lr:         1e-3,
            seed:       42,
        }
    }
}

/// Unfitted multilayer-perceptron regressor.
#[derive(Debug, Clone, Default)]
pub struct MlpRegressor {
    params: MlpParams,
}

impl MlpRegressor {
    pub fn new(params: MlpParams) -> Self {
        Self { params }
    }
}

impl Estimator for MlpRegressor {
    type Model = FittedRegressor;

    fn fit(&self, features: &FeatureMatrix, target: &TargetVector) -> PipelineResult<FittedRegressor> {
        let (n_rows, n_features) = features.dim();
        if n_rows == 0 || n_features == 0 {
            return Err(PipelineError::Training(format!(
                "cannot fit on a {n_rows}x{n_features} feature matrix"
            )));
        }
        if target.len() != n_rows {
            return Err(PipelineError::Training(format!(
                "{} targets for {} feature rows",
                target.len(),
                n_rows
            )));
        }
        if self.params.hidden == 0 || self.params.batch_size == 0 {
            return Err(PipelineError::Training(
                "hidden size and batch size must be at least 1".to_string(),
            ));
        }

        let device = NdArrayDevice::default();
        let p      = &self.params;

        // ── Scaling ───────────────────────────────────────────────────────────
        let x_scaler = StandardScaler::fit(features);
        let target   = target.to_vec();
        let y_scaler = TargetScaler::fit(&target);
        let x        = x_scaler.transform(features);
        let y: Vec<f32> = target.iter().map(|&v| y_scaler.transform(v)).collect();

        // ── Build model ───────────────────────────────────────────────────────
        let mut rng   = StdRng::seed_from_u64(p.seed);
        let model_cfg = SalaryRegressorConfig::new(n_features).with_hidden(p.hidden);
        let mut model: SalaryRegressor<TrainBackend> = model_cfg.init(&device, &mut rng);
        tracing::info!(
            "Fitting MLP: {} rows, {} features, hidden={}, epochs={}",
            n_rows, n_features, p.hidden, p.epochs
        );

        // ── Adam optimiser ────────────────────────────────────────────────────
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

        // ── Epoch loop ────────────────────────────────────────────────────────
        let mut order: Vec<usize> = (0..n_rows).collect();
        for epoch in 1..=p.epochs {
            order.shuffle(&mut rng);

            let mut loss_sum = 0.0f64;
            let mut batches  = 0usize;

            for chunk in order.chunks(p.batch_size) {
                let xb = batch_features::<TrainBackend>(&x, chunk, &device);
                let yb = batch_target::<TrainBackend>(&y, chunk, &device);

                let loss     = model.forward_loss(xb, yb);
                let loss_val = loss.clone().into_scalar().elem::<f64>();
                if !loss_val.is_finite() {
                    return Err(PipelineError::Training(format!(
                        "loss became {loss_val} in epoch {epoch}"
                    )));
                }
                loss_sum += loss_val;
                batches  += 1;

                // Backward pass + Adam update
                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(p.lr, model, grads);
            }

            let avg = loss_sum / batches.max(1) as f64;
            if epoch == 1 || epoch % 50 == 0 || epoch == p.epochs {
                tracing::info!("Epoch {:>4}/{} | train_loss={:.6}", epoch, p.epochs, avg);
            } else {
                tracing::debug!("Epoch {:>4}/{} | train_loss={:.6}", epoch, p.epochs, avg);
            }
        }

        // model.valid() → SalaryRegressor<InferBackend>
        Ok(FittedRegressor::new(model.valid(), model_cfg, x_scaler, y_scaler))
    }
}

/// Rows `idx` of `x` as a [len, n_features] tensor.
pub(crate) fn batch_features<B: Backend>(x: &Array2<f32>, idx: &[usize], device: &B::Device) -> Tensor<B, 2> {
    let n_features = x.ncols();
    let values: Vec<f32> = idx.iter().flat_map(|&i| x.row(i).to_vec()).collect();
    Tensor::<B, 2>::from_data(TensorData::new(values, [idx.len(), n_features]), device)
}

/// Elements `idx` of `y` as a [len, 1] tensor.
fn batch_target<B: Backend>(y: &[f32], idx: &[usize], device: &B::Device) -> Tensor<B, 2> {
    let values: Vec<f32> = idx.iter().map(|&i| y[i]).collect();
    Tensor::<B, 2>::from_data(TensorData::new(values, [idx.len(), 1]), device)
}
