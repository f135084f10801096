// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No result printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// Train, validate each epoch, then score the test set
pub mod train_use_case;

// Validate a data directory without training
pub mod check_data_use_case;
