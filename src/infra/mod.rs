// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   matrix_store.rs   — x_data.npy / y_data.npy persistence
//                       The hand-off between `prepare` and
//                       `train` / `predict`.
//
//   artifact_store.rs — Model artifact saving and loading
//                       A versioned bincode envelope around the
//                       estimator's payload, checked on load so
//                       only models that can predict come back.
//                       Also saves the run config as JSON.
//
//   metrics.rs        — Regression metrics
//                       MAE / MSE / RMSE / R² per split, appended
//                       to a CSV file for later comparison.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

/// Feature matrix / target vector .npy files
pub mod matrix_store;

/// Model artifact envelope and training config
pub mod artifact_store;

/// Regression metrics and the metrics CSV
pub mod metrics;
