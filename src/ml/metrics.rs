// ============================================================
// Layer 5 — Metrics
// ============================================================
// Three kinds of numbers come out of a training run:
//
//   EpochMetrics     — average loss / accuracy per training epoch
//   EvaluationScores — loss / accuracy on the validation set
//   Diagnostics      — RMSE, MAE and R² between ONE target vector
//                      and ONE predicted probability vector
//
// The diagnostics treat the two vectors as paired observations
// (one per category), not as a whole-validation-set aggregate.
// They are computed on the very last sample only, which reads
// like a placeholder; kept as-is so runs stay comparable.
//
// Reference: scikit-learn metric definitions (r2_score convention
//            for a constant target)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch:          usize,
    pub train_loss:     f64,
    pub train_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_accuracy: f64) -> Self {
        Self { epoch, train_loss, train_accuracy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScores {
    /// Mean categorical cross-entropy, NaN for an empty validation set
    pub loss:     f64,
    pub accuracy: f64,
}

impl EvaluationScores {
    /// Metric names in the order they are reported and tracked.
    pub fn named(&self) -> [(&'static str, f64); 2] {
        [("loss", self.loss), ("accuracy", self.accuracy)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rmse: f64,
    pub mae:  f64,
    pub r2:   f64,
}

/// RMSE, MAE and R² of `predicted` against `actual`.
///
/// R² is 1 - SS_res / SS_tot. When `actual` is constant (SS_tot = 0)
/// the score is 1.0 for a perfect prediction and 0.0 otherwise.
pub fn regression_diagnostics(actual: &[f32], predicted: &[f32]) -> Result<Diagnostics> {
    ensure!(
        actual.len() == predicted.len(),
        "cannot compare vectors of length {} and {}",
        actual.len(),
        predicted.len()
    );
    ensure!(!actual.is_empty(), "cannot compute diagnostics on empty vectors");

    let n = actual.len() as f64;
    let pairs = || actual.iter().zip(predicted).map(|(&a, &p)| (a as f64, p as f64));

    let ss_res: f64 = pairs().map(|(a, p)| (a - p).powi(2)).sum();
    let abs_err: f64 = pairs().map(|(a, p)| (a - p).abs()).sum();

    let mean   = actual.iter().map(|&a| a as f64).sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|&a| (a as f64 - mean).powi(2)).sum();

    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(Diagnostics {
        rmse: (ss_res / n).sqrt(),
        mae:  abs_err / n,
        r2,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_prediction() {
        let d = regression_diagnostics(&[0.0, 1.0, 0.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!(close(d.rmse, 0.0));
        assert!(close(d.mae, 0.0));
        assert!(close(d.r2, 1.0));
    }

    #[test]
    fn test_known_values() {
        // errors: 0.5, -0.5, 0.0, 0.0
        let d = regression_diagnostics(&[1.0, 0.0, 0.0, 0.0], &[0.5, 0.5, 0.0, 0.0]).unwrap();
        assert!(close(d.rmse, (0.5f64 / 4.0).sqrt()));
        assert!(close(d.mae, 0.25));
        // mean 0.25, ss_tot = 0.5625 + 3 * 0.0625 = 0.75, ss_res = 0.5
        assert!(close(d.r2, 1.0 - 0.5 / 0.75));
    }

    #[test]
    fn test_constant_target_with_error_scores_zero() {
        let d = regression_diagnostics(&[0.0, 0.0], &[0.5, 0.5]).unwrap();
        assert!(close(d.r2, 0.0));
        assert!(close(d.mae, 0.5));
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        assert!(regression_diagnostics(&[1.0], &[1.0, 0.0]).is_err());
        assert!(regression_diagnostics(&[], &[]).is_err());
    }

    #[test]
    fn test_evaluation_names() {
        let s = EvaluationScores { loss: 0.7, accuracy: 0.5 };
        assert_eq!(s.named()[0], ("loss", 0.7));
        assert_eq!(s.named()[1], ("accuracy", 0.5));
    }
}
