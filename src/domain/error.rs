// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every failure the pipeline can report has a name here.
//
//   MissingInput         — a file or a required column is absent
//   Format               — a file exists but has the wrong shape
//                          or content (dimensions, row counts,
//                          non-numeric data)
//   SchemaMismatch       — inference input width differs from
//                          the width the artifact was trained on
//   IncompatibleArtifact — the artifact decodes to something
//                          that cannot predict or has no width
//   Storage              — the artifact directory or file could
//                          not be written
//   Training             — the estimator could not be fitted
//
// Field-level parse problems are NOT errors: parsers return
// sentinel values instead (see data/parsers.rs).
//
// The CLI layer wraps these in anyhow for reporting, so every
// message here is written for a human reading a terminal.
//
// Reference: Rust Book §9 (Error Handling)

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used by every layer below the CLI.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("format error: {0}")]
    Format(String),

    #[error(
        "schema mismatch: the model expects {expected} features but the input has {actual}. \
         Use a feature matrix produced by the same `prepare` pipeline."
    )]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("incompatible artifact: {0}")]
    IncompatibleArtifact(String),

    #[error("storage failure at '{}': {source}", path.display())]
    Storage {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("training failed: {0}")]
    Training(String),
}

impl PipelineError {
    /// A required table column is absent when a stage runs.
    pub fn missing_column(stage: &str, column: &str) -> Self {
        PipelineError::MissingInput(format!(
            "stage '{stage}' requires column '{column}', which is not in the table"
        ))
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Storage { path: path.into(), source }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_names_both_counts() {
        let err = PipelineError::SchemaMismatch { expected: 4, actual: 5 };
        let msg = err.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_missing_column_mentions_stage_and_column() {
        let err = PipelineError::missing_column("parse_city", "город");
        let msg = err.to_string();
        assert!(matches!(err, PipelineError::MissingInput(_)));
        assert!(msg.contains("parse_city"));
        assert!(msg.contains("город"));
    }

    #[test]
    fn test_storage_keeps_io_source() {
        use std::error::Error as _;
        let io  = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PipelineError::storage("resources/salary_model.bin", io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("salary_model.bin"));
    }
}
