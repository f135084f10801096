// ============================================================
// Layer 4 — Validation/Training Splitter
// ============================================================
// Splits the loaded training directory into two sets:
//   - Validation set: the FIRST `validation_size` utterances
//   - Training set:   everything after them
//
// The split is positional, not random. Utterances arrive in
// sorted filename order, so the same directory always yields
// the same validation set. Randomness only enters later, as a
// fresh per-epoch shuffle inside each set.
//
// If there are fewer utterances than `validation_size`, all of
// them become validation data and the training set is empty.
//
// Reference: Rust Book §8 (Vectors)

use rand::{seq::SliceRandom, Rng};

/// Split `items` into (validation, training) by position.
///
/// # Example
/// ```ignore
/// let (valid, train) = split_validation((0..200).collect::<Vec<_>>(), 184);
/// assert_eq!((valid.len(), train.len()), (184, 16));
/// ```
pub fn split_validation<T>(mut items: Vec<T>, validation_size: usize) -> (Vec<T>, Vec<T>) {
    let split_at = validation_size.min(items.len());

    // split_off(n) leaves [0..n) in `items` and returns [n..)
    let train = items.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} validation, {} training",
        items.len(),
        train.len(),
    );

    (items, train)
}

/// Fisher-Yates shuffle of a dataset's visiting order.
pub fn shuffle_in_place<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
