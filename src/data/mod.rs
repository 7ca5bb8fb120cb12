// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw résumé CSV all the
// way to the numeric matrices the estimator is trained on.
//
// The pipeline flows in this order:
//
//   résumé .csv
//       │
//       ▼
//   CsvLoader          → reads rows, infers column types
//       │
//       ▼
//   Pipeline (chain)   → runs the stages in order:
//       │                  NormalizeColumns
//       │                  ParseGenderAge
//       │                  ParseSalary
//       │                  ParseCity
//       │                  (ParseExperience)
//       │                  EncodeCategoricals
//       ▼                  BuildMatrices
//   MatrixSink         → x_data.npy / y_data.npy
//
// Each module is responsible for exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Rust Book §17 (Trait Objects)

/// Loads résumé CSV exports with the csv crate
pub mod loader;

/// Pure cell parsers (gender, age, salary, city, experience)
pub mod parsers;

/// Per-run categorical → integer code mapping
pub mod encoder;

/// The concrete pipeline stages
pub mod stages;

/// Ordered stage chain and its builder
pub mod chain;

/// Shuffles and splits rows into train/validation sets
pub mod splitter;
