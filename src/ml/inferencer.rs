// ============================================================
// Layer 5 — Fitted Regressor (Inference)
// ============================================================
// A trained SalaryRegressor together with the scaling it was
// trained under. This is the value `train` writes into the
// artifact and `predict` reads back.
//
// Payload layout (bincode):
//   n_features, hidden   → rebuild SalaryRegressorConfig
//   x_scaler, y_scaler   → the fitted StandardScaler/TargetScaler
//   weights              → Burn record bytes (BinBytesRecorder,
//                          full precision)
//
// Restoring follows the checkpoint pattern: build an empty model
// of the right shape, then load_record() the saved weights into it.

use burn::{
    backend::ndarray::NdArrayDevice,
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::matrix::FeatureMatrix;
use crate::domain::traits::{Persistable, TrainedModel};
use crate::ml::model::{SalaryRegressor, SalaryRegressorConfig, SalaryRegressorRecord};
use crate::ml::scaler::{StandardScaler, TargetScaler};
use crate::ml::trainer::{batch_features, InferBackend};

type WeightsRecorder = BinBytesRecorder<FullPrecisionSettings>;

#[derive(Serialize, Deserialize)]
struct RegressorPayload {
    n_features: usize,
    hidden:     usize,
    x_scaler:   StandardScaler,
    y_scaler:   TargetScaler,
    weights:    Vec<u8>,
}

#[derive(Debug)]
pub struct FittedRegressor {
    model:    SalaryRegressor<InferBackend>,
    config:   SalaryRegressorConfig,
    x_scaler: StandardScaler,
    y_scaler: TargetScaler,
    device:   NdArrayDevice,
}

impl FittedRegressor {
    pub fn new(
        model:    SalaryRegressor<InferBackend>,
        config:   SalaryRegressorConfig,
        x_scaler: StandardScaler,
        y_scaler: TargetScaler,
    ) -> Self {
        Self { model, config, x_scaler, y_scaler, device: NdArrayDevice::default() }
    }
}

impl TrainedModel for FittedRegressor {
    fn n_features_in(&self) -> usize {
        self.config.n_features
    }

    fn predict(&self, features: &FeatureMatrix) -> PipelineResult<Vec<f32>> {
        if features.ncols() != self.n_features_in() {
            return Err(PipelineError::SchemaMismatch {
                expected: self.n_features_in(),
                actual:   features.ncols(),
            });
        }
        let n_rows = features.nrows();
        if n_rows == 0 {
            return Ok(Vec::new());
        }

        let x     = self.x_scaler.transform(features);
        let rows: Vec<usize> = (0..n_rows).collect();
        let input = batch_features::<InferBackend>(&x, &rows, &self.device);

        let scaled: Vec<f32> = self
            .model
            .forward(input)
            .reshape([n_rows])
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| PipelineError::Format(format!("cannot read predictions: {e:?}")))?;

        Ok(scaled.into_iter().map(|v| self.y_scaler.inverse(v)).collect())
    }
}

impl Persistable for FittedRegressor {
    const KIND: &'static str = "mlp-regressor";

    fn to_payload(&self) -> PipelineResult<Vec<u8>> {
        let weights = WeightsRecorder::default()
            .record(self.model.clone().into_record(), ())
            .map_err(|e| PipelineError::Training(format!("cannot serialise weights: {e}")))?;

        let payload = RegressorPayload {
            n_features: self.config.n_features,
            hidden:     self.config.hidden,
            x_scaler:   self.x_scaler.clone(),
            y_scaler:   self.y_scaler,
            weights,
        };
        bincode::serialize(&payload)
            .map_err(|e| PipelineError::Training(format!("cannot serialise model payload: {e}")))
    }

    fn from_payload(payload: &[u8], n_features_in: usize) -> PipelineResult<Self> {
        let payload: RegressorPayload = bincode::deserialize(payload).map_err(|e| {
            PipelineError::IncompatibleArtifact(format!("model payload does not decode: {e}"))
        })?;

        if payload.n_features != n_features_in || payload.x_scaler.n_features() != n_features_in {
            return Err(PipelineError::IncompatibleArtifact(format!(
                "artifact declares {} features but the model inside has {} (scaler {})",
                n_features_in,
                payload.n_features,
                payload.x_scaler.n_features()
            )));
        }

        let device = NdArrayDevice::default();
        let config = SalaryRegressorConfig::new(payload.n_features).with_hidden(payload.hidden);

        // Empty model of the right shape; its random weights are replaced below
        let empty: SalaryRegressor<InferBackend> = config.init(&device, &mut StdRng::seed_from_u64(0));
        let record: SalaryRegressorRecord<InferBackend> = WeightsRecorder::default()
            .load(payload.weights, &device)
            .map_err(|e| PipelineError::IncompatibleArtifact(format!("model weights do not load: {e}")))?;

        Ok(Self {
            model: empty.load_record(record),
            config,
            x_scaler: payload.x_scaler,
            y_scaler: payload.y_scaler,
            device,
        })
    }
}
