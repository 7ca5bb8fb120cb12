// ============================================================
// Layer 6 — Matrix Store (.npy)
// ============================================================
// Persists the chain's output so `train` and `predict` can run
// as separate processes:
//
//   <dir>/x_data.npy   2-D float32  [n_rows, n_features]
//   <dir>/y_data.npy   1-D float32  [n_rows]
//
// The files use the NumPy .npy format through ndarray-npy, so
// they open directly in NumPy as well.
//
// Reading is lenient about the element type: float32 is
// expected, but float64 and int64 files (what NumPy writes by
// default) are accepted and cast to f32. It is strict about the
// shape: a features file must be 2-D and a target file 1-D.
//
// Reference: Rust Book §12 (I/O and File Handling)

use std::{
    fs,
    path::{Path, PathBuf},
};

use ndarray::{ArrayD, Ix1, Ix2};
use ndarray_npy::{read_npy, write_npy, ReadNpyError, WriteNpyError};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::matrix::{FeatureMatrix, Matrices, TargetVector};
use crate::domain::traits::MatrixSink;

pub const FEATURES_FILE: &str = "x_data.npy";
pub const TARGET_FILE:   &str = "y_data.npy";

/// Reads and writes the matrix pair in one directory.
#[derive(Debug, Clone)]
pub struct NpyMatrixStore {
    dir: PathBuf,
}

impl NpyMatrixStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn features_path(&self) -> PathBuf {
        self.dir.join(FEATURES_FILE)
    }

    pub fn target_path(&self) -> PathBuf {
        self.dir.join(TARGET_FILE)
    }

    /// Write both files, creating the directory if needed.
    pub fn write(&self, matrices: &Matrices) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::storage(&self.dir, e))?;

        let x_path = self.features_path();
        let y_path = self.target_path();
        write_npy(&x_path, matrices.features()).map_err(|e| write_error(&x_path, e))?;
        write_npy(&y_path, matrices.target()).map_err(|e| write_error(&y_path, e))?;

        tracing::info!(
            "Wrote {} and {} to '{}'",
            FEATURES_FILE,
            TARGET_FILE,
            self.dir.display()
        );
        Ok(())
    }

    /// Read both files back as a row-aligned pair.
    pub fn read(&self) -> PipelineResult<Matrices> {
        let features = read_feature_matrix(&self.features_path())?;
        let target   = read_target_vector(&self.target_path())?;

        tracing::info!(
            "Read {}x{} feature matrix and {} targets from '{}'",
            features.nrows(),
            features.ncols(),
            target.len(),
            self.dir.display()
        );
        Matrices::new(features, target, Vec::new())
    }
}

impl MatrixSink for NpyMatrixStore {
    fn accept(&mut self, matrices: Matrices) -> PipelineResult<()> {
        self.write(&matrices)
    }
}

/// Read a 2-D feature matrix from a .npy file.
pub fn read_feature_matrix(path: &Path) -> PipelineResult<FeatureMatrix> {
    let array = read_any_as_f32(path)?;
    if array.ndim() != 2 {
        return Err(PipelineError::Format(format!(
            "'{}' holds a {}-D array, a 2-D feature matrix was expected",
            path.display(),
            array.ndim()
        )));
    }
    array
        .into_dimensionality::<Ix2>()
        .map_err(|e| PipelineError::Format(format!("'{}': {e}", path.display())))
}

/// Read a 1-D target vector from a .npy file.
pub fn read_target_vector(path: &Path) -> PipelineResult<TargetVector> {
    let array = read_any_as_f32(path)?;
    if array.ndim() != 1 {
        return Err(PipelineError::Format(format!(
            "'{}' holds a {}-D array, a 1-D target vector was expected",
            path.display(),
            array.ndim()
        )));
    }
    array
        .into_dimensionality::<Ix1>()
        .map_err(|e| PipelineError::Format(format!("'{}': {e}", path.display())))
}

/// Try float32, then float64, then int64.
fn read_any_as_f32(path: &Path) -> PipelineResult<ArrayD<f32>> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput(format!(
            "matrix file '{}' not found. Run `prepare` first.",
            path.display()
        )));
    }

    match read_npy::<_, ArrayD<f32>>(path) {
        Ok(array)                              => return Ok(array),
        Err(ReadNpyError::WrongDescriptor(_))  => {}
        Err(e)                                 => return Err(read_error(path, e)),
    }

    match read_npy::<_, ArrayD<f64>>(path) {
        Ok(array)                              => return Ok(array.mapv(|v| v as f32)),
        Err(ReadNpyError::WrongDescriptor(_))  => {}
        Err(e)                                 => return Err(read_error(path, e)),
    }

    read_npy::<_, ArrayD<i64>>(path)
        .map(|array| array.mapv(|v| v as f32))
        .map_err(|e| read_error(path, e))
}

fn read_error(path: &Path, e: ReadNpyError) -> PipelineError {
    match e {
        ReadNpyError::Io(io) => PipelineError::storage(path, io),
        other                => PipelineError::Format(format!("'{}': {other}", path.display())),
    }
}

fn write_error(path: &Path, e: WriteNpyError) -> PipelineError {
    match e {
        WriteNpyError::Io(io) => PipelineError::storage(path, io),
        other                 => PipelineError::Format(format!("'{}': {other}", path.display())),
    }
}
