// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any single
// business layer.
//
//   metrics.rs — Training metrics logging
//                Appends epoch-level loss and validation
//                accuracy to a CSV file when requested.
//
// Trained weights are not persisted: every run
// trains from scratch and reports its own test accuracy.

/// Training metrics CSV logger
pub mod metrics;
