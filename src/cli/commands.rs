// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `prepare`, `train`, `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, PathBuf, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    predict_use_case::PredictConfig,
    prepare_use_case::PrepareConfig,
    train_use_case::TrainConfig,
};
use crate::ml::trainer::MlpParams;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn a résumé CSV into x_data.npy / y_data.npy
    Prepare(PrepareArgs),

    /// Fit the salary model on prepared matrices
    Train(TrainArgs),

    /// Predict salaries for a prepared feature matrix
    Predict(PredictArgs),
}

/// All arguments for the `prepare` command.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Résumé table (UTF-8 CSV with a header row)
    pub table: PathBuf,

    /// Where to write the matrices [default: the CSV's directory]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Also derive `experience_years` from the "Опыт" column
    #[arg(long)]
    pub with_experience: bool,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            table_path:      a.table,
            output_dir:      a.output_dir,
            with_experience: a.with_experience,
        }
    }
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing x_data.npy and y_data.npy
    pub data_dir: PathBuf,

    /// Directory to save the model artifact, config and metrics
    #[arg(long, default_value = "resources")]
    pub artifact_dir: PathBuf,

    /// Seed for the train/test split, weight init and batch order
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of full passes through the training rows
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Width of the hidden layer
    #[arg(long, default_value_t = 32)]
    pub hidden: usize,

    /// Rows per optimiser step
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Share of rows used for the evaluation fit; the rest are scored
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            artifact_dir:   a.artifact_dir,
            train_fraction: a.train_fraction,
            model: MlpParams {
                hidden:     a.hidden,
                epochs:     a.epochs,
                batch_size: a.batch_size,
                lr:         a.lr,
                seed:       a.seed,
            },
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Feature matrix produced by `prepare` (x_data.npy)
    pub features: PathBuf,

    /// Directory the model artifact was saved to
    #[arg(long, default_value = "resources")]
    pub artifact_dir: PathBuf,
}

impl From<PredictArgs> for PredictConfig {
    fn from(a: PredictArgs) -> Self {
        PredictConfig {
            features_path: a.features,
            artifact_dir:  a.artifact_dir,
        }
    }
}
