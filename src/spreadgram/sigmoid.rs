//! Logistic link shared by the spreading step and the gradient.
//!
//! `likelihood = 1 / (1 + exp(x · y))`; a linked pair scores
//! `1 − likelihood`, an unlinked pair `likelihood`. Both are evaluated
//! without forming `exp` of a large positive argument, so the output
//! saturates at 0 or 1 instead of overflowing.

use serde::{Deserialize, Serialize};

/// Whether `x` is in the neighborhood of `y` (`u = 1` / `u = 0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborState {
    #[default]
    Linked,
    Unlinked,
}

impl NeighborState {
    /// 1 = linked, anything else = unlinked.
    pub fn from_flag(u: i32) -> Self {
        if u == 1 {
            Self::Linked
        } else {
            Self::Unlinked
        }
    }
}

/// `1 / (1 + exp(-z))` without overflow.
#[inline]
fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[inline]
pub(crate) fn sigmoid_at(x: f64, y: f64, state: NeighborState) -> f64 {
    let z = x * y;
    match state {
        NeighborState::Linked => logistic(z),
        NeighborState::Unlinked => logistic(-z),
    }
}

/// Elementwise sigmoid of `x[i] · y`.
pub fn sigmoid(x: &[f64], y: f64, state: NeighborState) -> Vec<f64> {
    x.iter().map(|&xi| sigmoid_at(xi, y, state)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_product_is_half() {
        assert_eq!(sigmoid(&[0.0], 3.0, NeighborState::Linked), vec![0.5]);
        assert_eq!(sigmoid(&[2.0], 0.0, NeighborState::Unlinked), vec![0.5]);
    }

    #[test]
    fn test_matches_closed_form() {
        let x = [1.0, 2.0, 3.0];
        let linked = sigmoid(&x, 2.0, NeighborState::Linked);
        for (xi, s) in x.iter().zip(&linked) {
            let likelihood = 1.0 / (1.0 + (xi * 2.0f64).exp());
            assert!((s - (1.0 - likelihood)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linked_and_unlinked_sum_to_one() {
        let x = [-40.0, -3.5, -0.1, 0.0, 0.7, 12.0, 800.0];
        for y in [-5.0, -1.0, 0.5, 1.0, 7.0] {
            let a = sigmoid(&x, y, NeighborState::Linked);
            let b = sigmoid(&x, y, NeighborState::Unlinked);
            for (p, q) in a.iter().zip(&b) {
                assert!((p + q - 1.0).abs() < 1e-12);
                assert!((0.0..=1.0).contains(p));
                assert!((0.0..=1.0).contains(q));
            }
        }
    }

    #[test]
    fn test_saturates_without_overflow() {
        let s = sigmoid(&[1e6, -1e6], 1e6, NeighborState::Linked);
        assert_eq!(s, vec![1.0, 0.0]);
        assert!(s.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_flag_codes() {
        assert_eq!(NeighborState::from_flag(1), NeighborState::Linked);
        assert_eq!(NeighborState::from_flag(0), NeighborState::Unlinked);
    }
}
