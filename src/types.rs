use std::iter;

use nalgebra::{Dyn, MatrixView, OMatrix, OVector, Vector2, U1};

pub type VecD = OVector<f64, Dyn>;
pub type VecDView<'a> = MatrixView<'a, f64, Dyn, U1, U1, Dyn>;

pub type MatD = OMatrix<f64, Dyn, Dyn>;
pub type MatDView<'a> = MatrixView<'a, f64, Dyn, Dyn>;

/// A point in the plane or in the parameter square `(u, v)`.
pub type Point2 = Vector2<f64>;

/// Views and edits of knot vectors stored as [`VecD`].
pub trait KnotSlices {
    /// The first `p + 1` knots, which equal the domain start of a clamped knot vector.
    fn leading(&self, p: usize) -> VecDView;

    /// The last `p + 1` knots, which equal the domain end of a clamped knot vector.
    fn trailing(&self, p: usize) -> VecDView;

    /// Returns a copy with the knot `u` repeated `r` times directly after the knot at index `k`.
    fn with_repeated(&self, k: usize, u: f64, r: usize) -> VecD;
}

impl KnotSlices for VecD {
    fn leading(&self, p: usize) -> VecDView {
        self.generic_view((0, 0), (Dyn(p + 1), U1))
    }

    fn trailing(&self, p: usize) -> VecDView {
        self.generic_view((self.len() - p - 1, 0), (Dyn(p + 1), U1))
    }

    fn with_repeated(&self, k: usize, u: f64, r: usize) -> VecD {
        let (head, tail) = self.as_slice().split_at(k + 1);
        VecD::from_iterator(
            self.len() + r,
            head.iter().copied().chain(iter::repeat(u).take(r)).chain(tail.iter().copied()),
        )
    }
}
