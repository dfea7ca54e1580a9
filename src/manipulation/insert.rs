//! Inserts additional knots into a B-spline curve without changing its shape.
//!
//! Inserting the knot `u` a number of `r` times into the knot span `[U_k, U_{k+1})` replaces the
//! control points `P_{k-p+1}, ..., P_{k-s}` by `r + k - s - (k - p + 1) + 1` new ones, where `s` is the
//! multiplicity the knot had before. All other control points are shifted.
//!
//! The control points are stored column-wise, so curves of any dimension (e.g. 2D, 3D, or homogeneous
//! coordinates) can be refined.

use thiserror::Error;

use crate::{
    knots::{find_multiplicity_with_tolerance, find_span, KnotError},
    tolerance::Tolerance,
    types::{KnotSlices, MatD, VecD},
};

#[derive(Error, Debug, PartialEq)]
pub enum InsertError {
    #[error("Parameter `u = {u}` lies outside the interval `({lower_bound}, {upper_bound})`.")]
    OutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },

    #[error(
        "The knot `u = {u}` has a multiplicity of `m = {m}` already. \
    Therefore, the knot cannot be inserted `{r}` times as this would exceed the maximum \
    multiplicity corresponding to the curve degree with `p = {p}`."
    )]
    MultiplicityError { u: f64, m: usize, r: usize, p: usize },

    #[error("Knot vector and control points do not match: {0}")]
    KnotError(#[from] KnotError),
}

/// Knot insertion algorithm by Boehm (algorithm A5.1 in `Piegl1997`).
///
/// Returns the refined knot vector and control points.
///
/// # Arguments
///
/// * `p` - The curve degree.
/// * `knots` - The knot vector with `count + p + 1` knots.
/// * `points` - The `count` control points as columns.
/// * `u` - The knot to be inserted. It must lie inside the domain `(U_p, U_count)`.
/// * `r` - The number of insertions of `u`.
pub fn insert_knot(p: usize, knots: &VecD, points: &MatD, u: f64, r: usize) -> Result<(VecD, MatD), InsertError> {
    let count = points.ncols();
    if knots.len() != count + p + 1 {
        return Err(KnotError::LengthMismatch { len: knots.len(), count, p }.into());
    }

    let (lower_bound, upper_bound) = (knots[p], knots[count]);
    // negated so that `NaN` is rejected as well
    if !(u > lower_bound && u < upper_bound) {
        return Err(InsertError::OutOfBounds { u, lower_bound, upper_bound });
    }

    let tolerance = Tolerance::default();
    let s = find_multiplicity_with_tolerance(u, knots, &tolerance);
    if s + r > p {
        return Err(InsertError::MultiplicityError { u, m: s, r, p });
    }

    // a knot close to an existing one is inserted as that knot, so that the span and `s` agree
    let u = match knots.iter().find(|&&knot| tolerance.is_close(u, knot)) {
        Some(&knot) => knot,
        None => u,
    };

    if r == 0 {
        return Ok((knots.clone(), points.clone()));
    }

    // the span search may return the span to the left of an existing knot
    let mut k = find_span(count, p, u, knots)?;
    while k + 1 < count && knots[k + 1] <= u {
        k += 1;
    }

    log::trace!("inserting knot u = {} {} times into span {} with multiplicity {}", u, r, k, s);

    let new_knots = knots.with_repeated(k, u, r);

    // Only the control points `k-p+1` to `k-s-1` change.
    let dim = points.nrows();
    let mut new_points = MatD::zeros(dim, count + r);

    let top_cols = k - p + 1;
    new_points.columns_mut(0, top_cols).copy_from(&points.columns(0, top_cols));

    let bot_cols = count - (k - s);
    new_points.columns_mut(k - s + r, bot_cols).copy_from(&points.columns(k - s, bot_cols));

    let mut local = MatD::zeros(dim, p + 1);
    local.columns_mut(0, p - s + 1).copy_from(&points.columns(k - p, p - s + 1));

    for j in 1..=r {
        let l = k - p + j;
        for i in 0..=p - j - s {
            let alpha = (u - knots[l + i]) / (knots[i + k + 1] - knots[l + i]);
            let blended = alpha * local.column(i + 1) + (1.0 - alpha) * local.column(i);
            local.set_column(i, &blended);
        }
        new_points.set_column(l, &local.column(0));
        new_points.set_column(k + r - j - s, &local.column(p - j - s));
    }

    let l = k - p + r;
    for i in l + 1..k - s {
        new_points.set_column(i, &local.column(i - l));
    }

    Ok((new_knots, new_points))
}
