// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly, only this one.
// Everything above it sees the Estimator / TrainedModel /
// Persistable traits from the domain layer.
//
// What's in this layer:
//
//   scaler.rs     — Standard scaling of features and target
//
//   model.rs      — The regressor architecture
//                   Linear → ReLU → Linear, seeded weights
//
//   trainer.rs    — MlpRegressor, the Estimator
//                   Seeded minibatches, MSE loss, Adam
//
//   inferencer.rs — FittedRegressor, the TrainedModel
//                   Predicts in salary units and converts
//                   itself to and from an artifact payload
//
// Backend: NdArray on the CPU, wrapped in Autodiff for training.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Feature and target standardisation
pub mod scaler;

/// Salary regressor architecture
pub mod model;

/// Training loop (the Estimator implementation)
pub mod trainer;

/// Fitted model: prediction and artifact payload
pub mod inferencer;
