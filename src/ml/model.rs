// ============================================================
// Layer 5 — Salary Regressor Architecture
// ============================================================
// A small fully-connected network:
//
//   features [batch, n_features]
//       │ Linear(n_features → hidden)
//       │ ReLU
//       │ Linear(hidden → 1)
//       ▼
//   salary (standardised) [batch, 1]
//
// Weights are drawn from a caller-supplied StdRng instead of the
// backend's global RNG, so one seed fixes the whole fit.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    module::Param,
    nn::{
        loss::{MseLoss, Reduction},
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::TensorData,
};
use rand::{rngs::StdRng, Rng};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SalaryRegressorConfig {
    pub n_features: usize,
    #[config(default = 32)]
    pub hidden:     usize,
}

impl SalaryRegressorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device, rng: &mut StdRng) -> SalaryRegressor<B> {
        SalaryRegressor {
            hidden: seeded_linear(self.n_features, self.hidden, device, rng),
            output: seeded_linear(self.hidden, 1, device, rng),
        }
    }
}

/// Linear layer with uniform(-1/√fan_in, 1/√fan_in) weights and biases.
fn seeded_linear<B: Backend>(
    d_input:  usize,
    d_output: usize,
    device:   &B::Device,
    rng:      &mut StdRng,
) -> Linear<B> {
    let bound = 1.0 / (d_input.max(1) as f32).sqrt();
    let mut draw = |n: usize| -> Vec<f32> { (0..n).map(|_| rng.gen_range(-bound..=bound)).collect() };

    let weight = Tensor::<B, 2>::from_data(
        TensorData::new(draw(d_input * d_output), [d_input, d_output]),
        device,
    );
    let bias = Tensor::<B, 1>::from_data(TensorData::new(draw(d_output), [d_output]), device);

    let mut linear = LinearConfig::new(d_input, d_output).init(device);
    linear.weight  = Param::from_tensor(weight);
    linear.bias    = Some(Param::from_tensor(bias));
    linear
}

#[derive(Module, Debug)]
pub struct SalaryRegressor<B: Backend> {
    pub hidden: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> SalaryRegressor<B> {
    /// x: [batch, n_features] → [batch, 1]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let h = burn::tensor::activation::relu(self.hidden.forward(x));
        self.output.forward(h)
    }

    /// Mean squared error against `target` [batch, 1].
    pub fn forward_loss(&self, x: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
        let pred = self.forward(x);
        MseLoss::new().forward(pred, target, Reduction::Mean)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use rand::SeedableRng;

    #[test]
    fn test_forward_shape() {
        let device = NdArrayDevice::default();
        let mut rng = StdRng::seed_from_u64(1);
        let model: SalaryRegressor<NdArray> =
            SalaryRegressorConfig::new(3).with_hidden(4).init(&device, &mut rng);

        let x   = Tensor::<NdArray, 2>::zeros([5, 3], &device);
        let out = model.forward(x);
        assert_eq!(out.dims(), [5, 1]);
    }

    #[test]
    fn test_same_seed_same_weights() {
        let device = NdArrayDevice::default();
        let cfg    = SalaryRegressorConfig::new(2).with_hidden(3);
        let a: SalaryRegressor<NdArray> = cfg.init(&device, &mut StdRng::seed_from_u64(9));
        let b: SalaryRegressor<NdArray> = cfg.init(&device, &mut StdRng::seed_from_u64(9));

        let wa = a.hidden.weight.val().into_data().to_vec::<f32>().unwrap();
        let wb = b.hidden.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(wa, wb);
    }
}
