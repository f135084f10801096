// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the .npz files on disk and the
// in-memory utterance sets the trainer iterates over.
//
//   <data_dir>/train/*.npz
//       │
//       ▼
//   NpzLoader         → reads + validates each utterance file
//       │
//       ▼
//   split_validation  → first 184 utterances = validation,
//       │               the rest = training
//       ▼
//   Trainer           → shuffles each set every epoch
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads .npz utterance files from a directory using ndarray-npy
pub mod loader;

/// Positional validation split and per-epoch shuffling
pub mod splitter;
