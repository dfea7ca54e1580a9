//! Evaluates the basis spline functions using the triangular Cox-de Boor recurrence.
//!
//! All functions follow the algorithms of chapter 2 in `Piegl1997`:
//!
//! | Function                           | Algorithm | Result                                                    |
//! |:-----------------------------------|:---------:|:----------------------------------------------------------|
//! | [`basis_functions`]                | A2.2      | the `p + 1` non-vanishing functions `N_{span-p..=span,p}` |
//! | [`basis_function_derivatives`]     | A2.3      | the above and their derivatives                           |
//! | [`one_basis_function`]             | A2.4      | a single function `N_{i,p}`                               |
//! | [`one_basis_function_derivatives`] | A2.5      | a single function and its derivatives                     |
//!
//! Knot spans of zero width are only valid where the recurrence never divides by them. Callers must
//! pass a `span` found by [`find_span`][crate::knots::find_span].

use crate::types::{MatD, VecD};

/// Returns the `p + 1` basis functions `N_{span-p,p}(u), ..., N_{span,p}(u)` that do not vanish on the knot span.
///
/// # Arguments
///
/// * `span` - The knot span containing `u`.
/// * `u` - The parameter.
/// * `p` - The basis degree.
/// * `knots` - The knot vector `U`.
pub fn basis_functions(span: usize, u: f64, p: usize, knots: &VecD) -> VecD {
    let mut n = VecD::zeros(p + 1);
    let mut left = VecD::zeros(p + 1);
    let mut right = VecD::zeros(p + 1);

    n[0] = 1.0;
    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;

        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// Returns the non-vanishing basis functions and their derivatives up to order `k_max`.
///
/// Row `r` of the returned `(p + 1) x (k_max + 1)` table holds the function `N_{span-p+r,p}`,
/// column `k` its `k`-th derivative. Derivatives of an order above `p` vanish and are returned as zeros.
pub fn basis_function_derivatives(span: usize, u: f64, p: usize, knots: &VecD, k_max: usize) -> MatD {
    let mut ders = MatD::zeros(p + 1, k_max + 1);

    // The upper triangle stores the basis functions, the lower triangle the knot differences.
    let mut ndu = MatD::zeros(p + 1, p + 1);
    let mut left = VecD::zeros(p + 1);
    let mut right = VecD::zeros(p + 1);

    ndu[(0, 0)] = 1.0;
    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;

        let mut saved = 0.0;
        for r in 0..j {
            ndu[(j, r)] = right[r + 1] + left[j - r];
            let temp = ndu[(r, j - 1)] / ndu[(j, r)];

            ndu[(r, j)] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[(j, j)] = saved;
    }

    for j in 0..=p {
        ders[(j, 0)] = ndu[(j, p)];
    }

    let n = k_max.min(p);

    // Two alternating rows of coefficients.
    let mut a = MatD::zeros(2, p + 1);
    for r in 0..=p {
        let (mut s1, mut s2) = (0, 1);
        a[(0, 0)] = 1.0;

        for k in 1..=n {
            let mut d = 0.0;
            let pk = p - k;

            if r >= k {
                let rk = r - k;
                a[(s2, 0)] = a[(s1, 0)] / ndu[(pk + 1, rk)];
                d = a[(s2, 0)] * ndu[(rk, pk)];
            }

            let j1 = if r + 1 >= k { 1 } else { k - r };
            let j2 = if r <= pk + 1 { k - 1 } else { p - r };

            for j in j1..=j2 {
                // `r + j >= k` holds for all `j >= j1`
                let rkj = r + j - k;
                a[(s2, j)] = (a[(s1, j)] - a[(s1, j - 1)]) / ndu[(pk + 1, rkj)];
                d += a[(s2, j)] * ndu[(rkj, pk)];
            }

            if r <= pk {
                a[(s2, k)] = -a[(s1, k - 1)] / ndu[(pk + 1, r)];
                d += a[(s2, k)] * ndu[(r, pk)];
            }

            ders[(r, k)] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    // Multiply by the falling factorial p (p-1) ... (p-k+1)
    let mut factor = p as f64;
    for k in 1..=n {
        ders.column_mut(k).scale_mut(factor);
        factor *= (p - k) as f64;
    }

    ders
}

/// Returns the value of the single basis function `N_{i,p}(u)`.
///
/// The function is `1` at the start of the domain for `i = 0` and at its end for the last function `i = n`.
/// Outside of its support `[U_i, U_{i+p+1}]` the function is `0`.
pub fn one_basis_function(p: usize, knots: &VecD, i: usize, u: f64) -> f64 {
    let last = knots.len() - 1;

    if (i == 0 && u == knots[0]) || (i + p + 2 == knots.len() && u == knots[last]) {
        return 1.0;
    }

    if u < knots[i] || u > knots[i + p + 1] {
        return 0.0;
    }

    let mut n = zeroth_degree_functions(p, knots, i, u);

    for k in 1..=p {
        let mut saved = 0.0;
        if n[0] != 0.0 {
            saved = (u - knots[i]) * n[0] / (knots[i + k] - knots[i]);
        }

        for j in 0..=p - k {
            let u_left = knots[i + j + 1];
            let u_right = knots[i + j + k + 1];

            if n[j + 1] == 0.0 {
                n[j] = saved;
                saved = 0.0;
            } else {
                let temp = n[j + 1] / (u_right - u_left);
                n[j] = saved + (u_right - u) * temp;
                saved = (u - u_left) * temp;
            }
        }
    }
    n[0]
}

/// Returns the single basis function `N_{i,p}(u)` followed by its derivatives up to order `k_max`.
///
/// Unlike [`one_basis_function`], the support is treated as half-open `[U_i, U_{i+p+1})`,
/// so all entries are `0` at the upper end of the support.
pub fn one_basis_function_derivatives(p: usize, knots: &VecD, i: usize, u: f64, k_max: usize) -> VecD {
    let mut ders = VecD::zeros(k_max + 1);

    if u < knots[i] || u >= knots[i + p + 1] {
        return ders;
    }

    // Column `k` holds the degree `k` functions N_{i+j,k} for `j = 0..=p-k`.
    let mut n = MatD::zeros(p + 1, p + 1);
    n.set_column(0, &zeroth_degree_functions(p, knots, i, u));

    for k in 1..=p {
        let mut saved = 0.0;
        if n[(0, k - 1)] != 0.0 {
            saved = (u - knots[i]) * n[(0, k - 1)] / (knots[i + k] - knots[i]);
        }

        for j in 0..=p - k {
            let u_left = knots[i + j + 1];
            let u_right = knots[i + j + k + 1];

            if n[(j + 1, k - 1)] == 0.0 {
                n[(j, k)] = saved;
                saved = 0.0;
            } else {
                let temp = n[(j + 1, k - 1)] / (u_right - u_left);
                n[(j, k)] = saved + (u_right - u) * temp;
                saved = (u - u_left) * temp;
            }
        }
    }

    ders[0] = n[(0, p)];

    let mut nd = VecD::zeros(p + 1);
    for k in 1..=k_max.min(p) {
        for j in 0..=k {
            nd[j] = n[(j, p - k)];
        }

        for jj in 1..=k {
            let degree = (p - k + jj) as f64;

            let mut saved = 0.0;
            if nd[0] != 0.0 {
                saved = nd[0] / (knots[i + p - k + jj] - knots[i]);
            }

            for j in 0..=k - jj {
                let u_left = knots[i + j + 1];
                let u_right = knots[i + j + p - k + jj + 1];

                if nd[j + 1] == 0.0 {
                    nd[j] = degree * saved;
                    saved = 0.0;
                } else {
                    let temp = nd[j + 1] / (u_right - u_left);
                    nd[j] = degree * (saved - temp);
                    saved = temp;
                }
            }
        }
        ders[k] = nd[0];
    }

    ders
}

/// Degree zero functions `N_{i+j,0}(u)` for `j = 0..=p`.
fn zeroth_degree_functions(p: usize, knots: &VecD, i: usize, u: f64) -> VecD {
    VecD::from_fn(p + 1, |j, _| if knots[i + j] <= u && u < knots[i + j + 1] { 1.0 } else { 0.0 })
}
