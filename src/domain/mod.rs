// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the system works
// with, independent of CSV, .npy files, or Burn:
//
//   table.rs  — the Record Table flowing through the chain
//   matrix.rs — the Feature Matrix / Target Vector pair
//   traits.rs — seams implemented by the other layers
//   error.rs  — the error taxonomy shared by every layer
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only data, invariants, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod error;

pub mod matrix;

pub mod table;

pub mod traits;
