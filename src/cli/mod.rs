// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `prepare` — résumé CSV → feature matrix + target vector
//   2. `train`   — matrices → model artifact
//   3. `predict` — feature matrix + artifact → one salary per line
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, PrepareArgs, TrainArgs};

/// The main CLI struct.
#[derive(Parser, Debug)]
#[command(
    name = "salary-pipeline",
    version = "0.1.0",
    about = "Prepare résumé tables, train a salary model, and predict salaries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => run_prepare(args),
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    let summary = PrepareUseCase::new(args.into()).execute()?;
    println!(
        "Prepared {} rows. Matrices written to '{}'.",
        summary.n_rows,
        summary.output_dir.display()
    );
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on matrices in: {}", args.data_dir.display());
    let report = TrainUseCase::new(args.into()).execute()?;

    for (split, metrics) in [("train", report.train), ("test", report.test)] {
        if let Some(m) = metrics {
            println!(
                "{split:<5} n={:<6} MAE={:.2} RMSE={:.2} R2={:.4}",
                m.n, m.mae, m.rmse, m.r2
            );
        }
    }
    println!("Training complete. Model saved to '{}'.", report.artifact_path.display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let predictions = PredictUseCase::new(args.into()).execute()?;
    for value in predictions {
        println!("{value:.2}");
    }
    Ok(())
}
