// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one user-facing goal per subcommand.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file format handling (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Each use case owns a serde config built from CLI arguments.
// Nothing is read from globals.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// CSV → stage chain → x_data.npy / y_data.npy
pub mod prepare_use_case;

// Matrices → evaluation fit → full fit → artifact
pub mod train_use_case;

// Feature matrix + artifact → salary predictions
pub mod predict_use_case;
