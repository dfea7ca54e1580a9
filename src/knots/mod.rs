//! Implements the knot vector utilities defining the [spline basis functions][crate::basis].
//!
//! A clamped knot vector of a degree `p` basis over `n + 1` control points is composed of
//! `n + p + 2` knots in ascending order.
//! The head and tail consist of `p + 1` knots of value `0` and `1`, respectively, once the vector
//! is normalized to the interval `[0, 1]`.
//!
//! Knot vectors are stored as plain [`VecD`]s. Validation happens on a normalized copy, the
//! stored vector is never modified.

use thiserror::Error;

use crate::{
    tolerance::Tolerance,
    types::{KnotSlices, VecD},
};

#[derive(Error, Debug, PartialEq)]
pub enum KnotError {
    #[error("Parameter `u = {u}` lies outside the interval `[{lower_bound}, {upper_bound}]`.")]
    ParameterOutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },

    #[error(
        "The knot vector of length {len} cannot hold {count} control points \
        of a basis with degree `p = {p}`."
    )]
    LengthMismatch { len: usize, count: usize, p: usize },
}

/// Returns `true` if the parameter `u` lies in the interval `[0, 1]`.
pub fn is_valid_parameter(u: f64) -> bool {
    (0.0..=1.0).contains(&u)
}

/// Rescales the knots linearly so that the smallest knot becomes `0` and the largest `1`.
pub fn normalize(knots: &mut VecD) {
    let old_lim = (knots.min(), knots.max());

    rescale(knots, old_lim, (0.0, 1.0))
}

pub fn normalized(knots: &VecD) -> VecD {
    let mut copy = knots.clone();
    normalize(&mut copy);
    copy
}

fn rescale(knots: &mut VecD, old_lim: (f64, f64), new_lim: (f64, f64)) {
    let n = knots.len();
    *knots -= VecD::repeat(n, old_lim.0);
    *knots /= old_lim.1 - old_lim.0;
    *knots *= new_lim.1 - new_lim.0;
    *knots += VecD::repeat(n, new_lim.0);
}

/// Checks that `knots` is a valid clamped knot vector for `count` control points of a degree `p` basis.
///
/// The check runs on a normalized copy and uses the default [`Tolerance`]. It fails if
/// - the length differs from `count + p + 1`,
/// - the first `p + 1` knots are not `0`,
/// - the last `p + 1` knots are not `1`, or
/// - the knots are decreasing anywhere.
pub fn check_knot_vector(p: usize, knots: &VecD, count: usize) -> bool {
    check_knot_vector_with_tolerance(p, knots, count, &Tolerance::default())
}

pub fn check_knot_vector_with_tolerance(p: usize, knots: &VecD, count: usize, tolerance: &Tolerance) -> bool {
    if knots.len() != count + p + 1 {
        return false;
    }

    let normed = normalized(knots);

    let is_head_clamped = tolerance.all_close(normed.leading(p).iter(), 0.0);
    let is_tail_clamped = tolerance.all_close(normed.trailing(p).iter(), 1.0);

    is_head_clamped && is_tail_clamped && is_sorted(knots)
}

pub fn is_sorted(knots: &VecD) -> bool {
    knots.as_slice().windows(2).all(|w| w[0] <= w[1])
}

/// Returns the index `i` of the knot span `[U_i, U_{i+1}]` containing `u` (algorithm A2.1 in `Piegl1997`).
///
/// # Arguments
///
/// * `count` - The number of control points `n + 1`.
/// * `p` - The basis degree.
/// * `u` - The parameter, which must lie in `[U_p, U_{n+1}]`.
/// * `knots` - The knot vector `U`.
///
/// A parameter at the end of the domain yields the last non-empty span `n`.
/// Parameters on an interior knot may yield the span on either side of the knot, but never an empty span.
pub fn find_span(count: usize, p: usize, u: f64, knots: &VecD) -> Result<usize, KnotError> {
    find_span_with_tolerance(count, p, u, knots, &Tolerance::SPAN)
}

pub fn find_span_with_tolerance(
    count: usize,
    p: usize,
    u: f64,
    knots: &VecD,
    tolerance: &Tolerance,
) -> Result<usize, KnotError> {
    if knots.len() < count + p + 1 || count <= p {
        return Err(KnotError::LengthMismatch { len: knots.len(), count, p });
    }

    if tolerance.is_close(u, knots[count]) {
        return Ok(count - 1);
    }

    let (lower_bound, upper_bound) = (knots[p], knots[count]);
    if !(lower_bound..=upper_bound).contains(&u) {
        return Err(KnotError::ParameterOutOfBounds { u, lower_bound, upper_bound });
    }

    let mut low = p;
    let mut high = count;
    // round up on odd sums for the first bisection
    let mut mid = (low + high + 1) / 2;

    while u < knots[mid] || u > knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    // `u` sits on a repeated knot, step over the empty spans
    while knots[mid] == knots[mid + 1] && mid + 1 < count {
        mid += 1;
    }

    Ok(mid)
}

/// Returns the number of knots approximately equal to `u`.
pub fn find_multiplicity(u: f64, knots: &VecD) -> usize {
    find_multiplicity_with_tolerance(u, knots, &Tolerance::default())
}

pub fn find_multiplicity_with_tolerance(u: f64, knots: &VecD, tolerance: &Tolerance) -> usize {
    knots.iter().filter(|&&x| tolerance.is_close(u, x)).count()
}

/// Generates a uniform, clamped knot vector on `[0, 1]` for `count` control points of a degree `p` basis.
pub fn generate_uniform_clamped(p: usize, count: usize) -> VecD {
    let len = count + p + 1;
    let middle = len - 2 * p;

    VecD::from_fn(len, |i, _| {
        if i < p {
            0.0
        } else if i >= p + middle {
            1.0
        } else if middle == 1 {
            0.0
        } else {
            (i - p) as f64 / (middle - 1) as f64
        }
    })
}
