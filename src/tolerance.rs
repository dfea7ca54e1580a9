//! Tolerances for approximate floating point comparisons.
//!
//! Knot vectors are compared after normalization, which can introduce small drifts, so all knot
//! comparisons in this crate go through a [`Tolerance`] instead of `==`.

use approx::{abs_diff_eq, relative_eq};

/// Relative and absolute tolerance of an approximate comparison.
///
/// Two values `a` and `b` are considered close if `|a - b| <= absolute` or
/// `|a - b| <= relative * max(|a|, |b|)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Tolerance {
    /// Tolerance used to detect a parameter lying on the end of the knot vector domain.
    pub const SPAN: Tolerance = Tolerance { relative: 1e-6, absolute: 1e-8 };

    pub const fn new(relative: f64, absolute: f64) -> Self {
        Tolerance { relative, absolute }
    }

    pub fn is_close(&self, a: f64, b: f64) -> bool {
        relative_eq!(a, b, epsilon = self.absolute, max_relative = self.relative)
    }

    pub fn is_zero(&self, a: f64) -> bool {
        abs_diff_eq!(a, 0.0, epsilon = self.absolute)
    }

    /// Returns `true` if every entry of `values` is close to `expected`.
    pub fn all_close<'a>(&self, values: impl IntoIterator<Item = &'a f64>, expected: f64) -> bool {
        values.into_iter().all(|&x| self.is_close(x, expected))
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance { relative: 1e-5, absolute: 1e-8 }
    }
}
