// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the system. Every layer above talks to these
// traits, never to a concrete loader, stage, or model:
//
//   TableSource   — something that produces a RecordTable
//                   (CsvLoader)
//   Stage         — one step of the processing chain
//                   (data/stages.rs)
//   MatrixSink    — receiver of the chain's final matrices
//                   (NpyMatrixStore, or an in-memory capture)
//   Estimator     — an unfitted learning algorithm
//   TrainedModel  — what any artifact must be able to do:
//                   predict, and say how wide its input is
//   Persistable   — a TrainedModel that can be written into
//                   and restored from an artifact payload
//
// The last three replace "has a predict attribute" style checks
// with a contract the compiler enforces. The artifact store only
// restores types that implement Persistable, so anything it hands
// back can predict and knows its feature count.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::error::PipelineResult;
use crate::domain::matrix::{FeatureMatrix, Matrices, TargetVector};
use crate::domain::table::RecordTable;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can load a raw record table.
pub trait TableSource {
    fn load_table(&self) -> PipelineResult<RecordTable>;
}

// ─── Stage ────────────────────────────────────────────────────────────────────
/// One transformation step of the chain.
///
/// The table is moved in and moved out, so the stage owns it
/// exclusively for the duration of the call. A stage must not
/// change the row count.
pub trait Stage {
    /// Stable name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Transform the table, or fail if a required column is absent.
    fn process(&mut self, table: RecordTable) -> PipelineResult<RecordTable>;
}

// ─── MatrixSink ───────────────────────────────────────────────────────────────
/// Receives the feature matrix and target vector built by the
/// terminal stage.
pub trait MatrixSink {
    fn accept(&mut self, matrices: Matrices) -> PipelineResult<()>;
}

// ─── Estimator / TrainedModel ─────────────────────────────────────────────────
/// An unfitted learning algorithm with its hyperparameters.
pub trait Estimator {
    type Model: TrainedModel;

    fn fit(&self, features: &FeatureMatrix, target: &TargetVector) -> PipelineResult<Self::Model>;
}

/// The capabilities every loaded artifact must provide.
pub trait TrainedModel {
    /// Number of feature columns the model was trained on.
    fn n_features_in(&self) -> usize;

    /// One prediction per input row, in row order.
    fn predict(&self, features: &FeatureMatrix) -> PipelineResult<Vec<f32>>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// A trained model that can live inside an artifact file.
pub trait Persistable: TrainedModel + Sized {
    /// Name written into the artifact so the loader can pick the
    /// right decoder.
    const KIND: &'static str;

    fn to_payload(&self) -> PipelineResult<Vec<u8>>;

    /// Rebuild the model from its payload. `n_features_in` is the
    /// width recorded in the artifact envelope.
    fn from_payload(payload: &[u8], n_features_in: usize) -> PipelineResult<Self>;
}
