// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing the problem:
// utterances made of frames, and things that classify frames.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A frame-aligned (features, one-hot labels) pair
pub mod utterance;

// Core abstractions (traits) that other layers implement
pub mod traits;
