// ============================================================
// Layer 6 — Model Artifact Store
// ============================================================
// Saves a trained model to disk and loads it back for `predict`.
//
// What gets saved:
//   1. salary_model.bin   — the artifact envelope (bincode)
//   2. train_config.json  — the hyperparameters of the run
//
// Envelope layout:
//
//   magic          "SALARY-ARTIFACT"
//   version        format version (currently 1)
//   estimator      kind tag, e.g. "mlp-regressor"
//   n_features_in  feature count the model was trained on
//   payload        estimator-specific bytes (Persistable)
//
// Loading checks the envelope before anything else. An artifact
// from another program, a newer format, an estimator kind this
// build does not know, or one without a feature count is refused
// with IncompatibleArtifact. Nothing that reaches the predictor
// is untyped: load() only ever returns a Box<dyn TrainedModel>.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §17 (Trait Objects)

use std::{fs, path::PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::{Persistable, TrainedModel};
use crate::ml::inferencer::FittedRegressor;

pub const MODEL_FILE:  &str = "salary_model.bin";
pub const CONFIG_FILE: &str = "train_config.json";

const MAGIC:          &str = "SALARY-ARTIFACT";
const FORMAT_VERSION: u32  = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    magic:         String,
    version:       u32,
    estimator:     String,
    n_features_in: Option<usize>,
    payload:       Vec<u8>,
}

type Decoder = fn(&[u8], usize) -> PipelineResult<Box<dyn TrainedModel>>;

fn decode_as<M: Persistable + 'static>(payload: &[u8], n_features_in: usize) -> PipelineResult<Box<dyn TrainedModel>> {
    Ok(Box::new(M::from_payload(payload, n_features_in)?))
}

/// Estimator kinds this build can restore.
fn decoder_for(kind: &str) -> Option<Decoder> {
    match kind {
        k if k == FittedRegressor::KIND => Some(decode_as::<FittedRegressor> as Decoder),
        _ => None,
    }
}

/// Reads and writes model artifacts in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    /// Persist `model`, creating the directory if needed.
    /// Returns the path of the written artifact.
    pub fn save<M: Persistable>(&self, model: &M) -> PipelineResult<PathBuf> {
        let envelope = ArtifactEnvelope {
            magic:         MAGIC.to_string(),
            version:       FORMAT_VERSION,
            estimator:     M::KIND.to_string(),
            n_features_in: Some(model.n_features_in()),
            payload:       model.to_payload()?,
        };
        let path = self.write_envelope(&envelope)?;

        tracing::info!(
            "Saved '{}' model ({} features) to '{}'",
            M::KIND,
            model.n_features_in(),
            path.display()
        );
        Ok(path)
    }

    /// Load the artifact as a model that can predict.
    pub fn load(&self) -> PipelineResult<Box<dyn TrainedModel>> {
        let path = self.model_path();
        if !path.is_file() {
            return Err(PipelineError::MissingInput(format!(
                "no model artifact at '{}'. Run `train` first.",
                path.display()
            )));
        }

        let bytes = fs::read(&path).map_err(|e| PipelineError::storage(&path, e))?;
        let envelope: ArtifactEnvelope = bincode::deserialize(&bytes).map_err(|e| {
            PipelineError::IncompatibleArtifact(format!(
                "'{}' is not a salary model artifact: {e}",
                path.display()
            ))
        })?;

        if envelope.magic != MAGIC {
            return Err(PipelineError::IncompatibleArtifact(format!(
                "'{}' is not a salary model artifact",
                path.display()
            )));
        }
        if envelope.version > FORMAT_VERSION {
            return Err(PipelineError::IncompatibleArtifact(format!(
                "artifact format version {} is newer than the supported version {}",
                envelope.version, FORMAT_VERSION
            )));
        }
        let n_features_in = envelope.n_features_in.ok_or_else(|| {
            PipelineError::IncompatibleArtifact(
                "artifact does not record how many features the model expects".to_string(),
            )
        })?;
        if envelope.payload.is_empty() {
            return Err(PipelineError::IncompatibleArtifact(
                "artifact holds no model payload".to_string(),
            ));
        }
        let decode = decoder_for(&envelope.estimator).ok_or_else(|| {
            PipelineError::IncompatibleArtifact(format!(
                "unknown estimator kind '{}'; the artifact cannot predict",
                envelope.estimator
            ))
        })?;

        let model = decode(&envelope.payload, n_features_in)?;
        tracing::info!(
            "Loaded '{}' model ({} features) from '{}'",
            envelope.estimator,
            model.n_features_in(),
            path.display()
        );
        Ok(model)
    }

    /// Write the run's configuration next to the artifact.
    pub fn save_config<T: Serialize>(&self, cfg: &T) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::storage(&self.dir, e))?;
        let path = self.dir.join(CONFIG_FILE);

        let json = serde_json::to_string_pretty(cfg)
            .map_err(|e| PipelineError::Format(format!("cannot encode training config: {e}")))?;
        fs::write(&path, json).map_err(|e| PipelineError::storage(&path, e))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    fn write_envelope(&self, envelope: &ArtifactEnvelope) -> PipelineResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::storage(&self.dir, e))?;

        let bytes = bincode::serialize(envelope)
            .map_err(|e| PipelineError::Format(format!("cannot encode artifact: {e}")))?;

        let path = self.model_path();
        fs::write(&path, bytes).map_err(|e| PipelineError::storage(&path, e))?;
        Ok(path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matrix::FeatureMatrix;
    use crate::domain::traits::Estimator;
    use crate::ml::trainer::{MlpParams, MlpRegressor};
    use ndarray::array;

    /// Predicts a constant. Not registered, so it can be saved
    /// but never loaded.
    struct ConstantModel;

    impl TrainedModel for ConstantModel {
        fn n_features_in(&self) -> usize {
            1
        }

        fn predict(&self, features: &FeatureMatrix) -> PipelineResult<Vec<f32>> {
            Ok(vec![1.0; features.nrows()])
        }
    }

    impl Persistable for ConstantModel {
        const KIND: &'static str = "constant";

        fn to_payload(&self) -> PipelineResult<Vec<u8>> {
            Ok(vec![0])
        }

        fn from_payload(_: &[u8], _: usize) -> PipelineResult<Self> {
            Ok(ConstantModel)
        }
    }

    fn envelope(n_features_in: Option<usize>, payload: Vec<u8>) -> ArtifactEnvelope {
        ArtifactEnvelope {
            magic:     MAGIC.to_string(),
            version:   FORMAT_VERSION,
            estimator: FittedRegressor::KIND.to_string(),
            n_features_in,
            payload,
        }
    }

    fn expect_incompatible(store: &ArtifactStore) {
        match store.load() {
            Err(PipelineError::IncompatibleArtifact(_)) => {}
            Err(other) => panic!("expected IncompatibleArtifact, got {other}"),
            Ok(_)      => panic!("expected IncompatibleArtifact, got a model"),
        }
    }

    #[test]
    fn test_saved_model_loads_and_predicts() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("resources"));

        let x      = array![[1.0f32, 2.0], [2.0, 1.0], [3.0, 3.0]];
        let y      = array![100.0f32, 200.0, 300.0];
        let params = MlpParams { epochs: 3, hidden: 4, ..MlpParams::default() };
        let model  = MlpRegressor::new(params).fit(&x, &y).unwrap();
        let path   = store.save(&model).unwrap();
        assert!(path.ends_with(MODEL_FILE));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.n_features_in(), 2);
        assert_eq!(loaded.predict(&x).unwrap(), model.predict(&x).unwrap());
    }

    #[test]
    fn test_unwritable_directory_is_storage_failure() {
        let dir      = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("resources");
        fs::write(&occupied, b"a file, not a directory").unwrap();

        let err = ArtifactStore::new(&occupied).save(&ConstantModel).unwrap_err();
        assert!(matches!(err, PipelineError::Storage { .. }));
        assert!(occupied.is_file());
    }

    #[test]
    fn test_missing_artifact_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactStore::new(dir.path()).load().err().unwrap();
        assert!(matches!(err, PipelineError::MissingInput(_)));
        assert!(err.to_string().contains("train"));
    }

    #[test]
    fn test_unknown_estimator_kind_is_refused() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&ConstantModel).unwrap();
        expect_incompatible(&store);
    }

    #[test]
    fn test_missing_feature_count_is_refused() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.write_envelope(&envelope(None, vec![1, 2, 3])).unwrap();
        expect_incompatible(&store);
    }

    #[test]
    fn test_empty_payload_is_refused() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.write_envelope(&envelope(Some(2), Vec::new())).unwrap();
        expect_incompatible(&store);
    }

    #[test]
    fn test_foreign_file_is_refused() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(store.model_path(), b"\x80\x04pickled sklearn model").unwrap();
        expect_incompatible(&store);

        let mut env = envelope(Some(2), vec![1]);
        env.magic   = "SOMETHING-ELSE".to_string();
        store.write_envelope(&env).unwrap();
        expect_incompatible(&store);
    }

    #[test]
    fn test_newer_format_is_refused() {
        let dir     = tempfile::tempdir().unwrap();
        let store   = ArtifactStore::new(dir.path());
        let mut env = envelope(Some(2), vec![1]);
        env.version = FORMAT_VERSION + 1;
        store.write_envelope(&env).unwrap();
        expect_incompatible(&store);
    }

    #[test]
    fn test_save_config_writes_json() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save_config(&MlpParams::default()).unwrap();
        let json  = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        let back: MlpParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MlpParams::default());
    }
}
