// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Splits samples into two ordered partitions:
//   - Training set:   samples[..split_at]
//   - Validation set: samples[split_at..]
//
// where split_at = floor(train_fraction * total).
//
// There is NO shuffling: the partition follows the order the
// data source provided, so the same input always produces the
// same boundary.
//
// Example: 10 samples, fraction 0.8 → 8 training, 2 validation
//          7 samples,  fraction 0.8 → floor(5.6) = 5 / 2
//
// Reference: Rust Book §8 (Vectors)

/// Index of the first validation sample.
pub fn split_index(total: usize, train_fraction: f64) -> usize {
    let split_at = ((total as f64) * train_fraction).floor();
    // Clamp so fractions outside [0, 1] cannot index past the ends
    (split_at.max(0.0) as usize).min(total)
}

/// Split `samples` into (train, validation) at `split_index`.
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let split_at = split_index(total, train_fraction);

    // After this: samples = [0..split_at], val = [split_at..total]
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split at {}: {} training, {} validation",
        split_at,
        samples.len(),
        val.len(),
    );

    (samples, val)
}
