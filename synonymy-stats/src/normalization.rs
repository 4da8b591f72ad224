//! Min-max scaling of raw similarity scores.
//!
//! Scores produced by embedding similarity have arbitrary bounded magnitude.
//! [`min_max`] rescales them to `[0, 1]` and rounds to a fixed number of
//! decimal places so that floating-point noise does not leak into the
//! distances derived from them.

use synonymy_core::{Result, SynonymyError};

/// Decimal places kept after scaling unless the caller asks otherwise.
pub const DEFAULT_PRECISION: u32 = 6;

/// Largest precision accepted; beyond this `f64` has no digits left to round.
pub const MAX_PRECISION: u32 = 15;

/// Round `value` to `precision` decimal places (half away from zero).
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Rescale `scores` to `[0, 1]` via `(x - min) / (max - min)`, rounded to
/// `precision` decimal places.
///
/// Fails with [`SynonymyError::DegenerateRange`] when every score is equal;
/// the result would otherwise be NaN. Idempotent on non-degenerate input.
pub fn min_max(scores: &[f64], precision: u32) -> Result<Vec<f64>> {
    if scores.is_empty() {
        return Err(SynonymyError::EmptySample(
            "min_max: no scores to normalize".into(),
        ));
    }
    if precision > MAX_PRECISION {
        return Err(SynonymyError::InvalidInput(format!(
            "min_max: precision {} exceeds {}",
            precision, MAX_PRECISION
        )));
    }
    if let Some(pos) = scores.iter().position(|v| !v.is_finite()) {
        return Err(SynonymyError::InvalidInput(format!(
            "min_max: score {} is not finite ({})",
            pos, scores[pos]
        )));
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return Err(SynonymyError::DegenerateRange { value: min });
    }

    Ok(scores
        .iter()
        .map(|&v| round_to((v - min) / range, precision))
        .collect())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn min_max_is_idempotent(scores in proptest::collection::vec(-50.0f64..50.0, 2..64)) {
            if let Ok(once) = min_max(&scores, DEFAULT_PRECISION) {
                let twice = min_max(&once, DEFAULT_PRECISION).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn min_max_stays_in_unit_interval(scores in proptest::collection::vec(-1.0f64..1.0, 2..64)) {
            if let Ok(out) = min_max(&scores, DEFAULT_PRECISION) {
                for v in out {
                    prop_assert!((0.0..=1.0).contains(&v), "v={}", v);
                    prop_assert!(!v.is_nan());
                }
            }
        }
    }
}
