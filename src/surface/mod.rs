//! Implements the tensor-product B-spline surface.
//!
//! A B-spline surface maps the parameters `(u, v) ∈ [0,1]²` onto the plane
//!
//! `S(u, v) = Σ_i Σ_j N_{i,p}(u) N_{j,q}(v) P_{i,j}`
//!
//! with
//! - the degrees `p` and `q` in the `u` and `v` direction,
//! - the [basis functions][crate::basis] `N` defined by one [knot vector][crate::knots] per direction, and
//! - the `(n + 1) x (m + 1)` grid of two-dimensional control points `P`.
//!
//! Only the `(p + 1) x (q + 1)` control points of the knot spans containing `u` and `v` contribute to a point.
//!
//! Surfaces are assembled stage by stage with a [`SurfaceBuilder`] and cannot be modified afterwards.

use std::fmt;

use nalgebra::Vector2;
use thiserror::Error;

use crate::{
    basis::{basis_function_derivatives, basis_functions},
    knots::{find_span, is_valid_parameter, KnotError},
    tolerance::Tolerance,
    types::{MatD, MatDView, Point2, VecD},
};

pub use builder::SurfaceBuilder;

mod builder;

/// The two parametric directions of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    U,
    V,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::U => write!(f, "u"),
            Direction::V => write!(f, "v"),
        }
    }
}

/// The construction stages of a [`SurfaceBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Degree(Direction),
    ControlPointCount(Direction),
    ControlPoints,
    Knots(Direction),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Degree(d) => write!(f, "degree in {}", d),
            Stage::ControlPointCount(d) => write!(f, "control point count in {}", d),
            Stage::ControlPoints => write!(f, "control points"),
            Stage::Knots(d) => write!(f, "knot vector in {}", d),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SurfaceError {
    #[error("The {missing} must be set before the {stage}.")]
    ConstructionOrder { stage: Stage, missing: Stage },

    #[error("The {0} has not been set.")]
    Incomplete(Stage),

    #[error("Degree `p = {p}` in {direction} is too low and must be greater than `0`.")]
    DegreeTooLow { direction: Direction, p: usize },

    #[error(
        "A surface of degree `p = {p}` in {direction} requires at least `{required}` control points, \
        but `{count}` were given."
    )]
    TooFewControlPoints { direction: Direction, p: usize, count: usize, required: usize },

    #[error("Control points must be two-dimensional but have `{dimension}` coordinates.")]
    ControlPointDimension { dimension: usize },

    #[error("The control point grid requires `{expected}` control points, but `{count}` were given.")]
    ControlPointCount { expected: usize, count: usize },

    #[error("The knot vector in {direction} is invalid for degree `p = {p}` and `{count}` control points.")]
    InvalidKnotVector { direction: Direction, p: usize, count: usize },

    #[error("Parameter `{direction} = {value}` lies outside the interval `[0, 1]`.")]
    ParameterOutOfBounds { direction: Direction, value: f64 },

    #[error("Parameters must be stored as `(u, v)` columns in 2 rows, but `{rows}` rows were given.")]
    ParameterShape { rows: usize },

    #[error("Span search failed: {0}")]
    KnotError(#[from] KnotError),
}

/// Degree, knot vector and control point count of one parametric direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Parametrization {
    p: usize,
    count: usize,
    knots: VecD,
}

impl Parametrization {
    pub fn degree(&self) -> usize {
        self.p
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn knots(&self) -> &VecD {
        &self.knots
    }

    fn span(&self, direction: Direction, value: f64) -> Result<usize, SurfaceError> {
        if !is_valid_parameter(value) {
            return Err(SurfaceError::ParameterOutOfBounds { direction, value });
        }
        Ok(find_span(self.count, self.p, value, &self.knots)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    u: Parametrization,
    v: Parametrization,
    /// One `count_u x count_v` grid per coordinate.
    grids: [MatD; 2],
    tolerance: Tolerance,
}

impl Surface {
    /// Returns a builder to assemble a surface stage by stage.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::DMatrix;
    /// use speckle_splines::knots::generate_uniform_clamped;
    /// use speckle_splines::surface::Surface;
    ///
    /// // A 3 x 3 grid of control points with `x = i` and `y = j`.
    /// let points = DMatrix::from_fn(2, 9, |c, k| if c == 0 { (k / 3) as f64 } else { (k % 3) as f64 });
    ///
    /// let surface = Surface::builder()
    ///     .degree_u(2)
    ///     .and_then(|b| b.degree_v(2))
    ///     .and_then(|b| b.control_point_count_u(3))
    ///     .and_then(|b| b.control_point_count_v(3))
    ///     .and_then(|b| b.control_points(points))
    ///     .and_then(|b| b.knots_u(generate_uniform_clamped(2, 3)))
    ///     .and_then(|b| b.knots_v(generate_uniform_clamped(2, 3)))
    ///     .and_then(|b| b.build())
    ///     .unwrap();
    ///
    /// println!("{:?}", surface.evaluate(0.5, 0.5));
    /// ```
    pub fn builder() -> SurfaceBuilder {
        SurfaceBuilder::new()
    }

    pub(crate) fn new(u: Parametrization, v: Parametrization, points: &MatD, tolerance: Tolerance) -> Self {
        let grids = [0, 1].map(|c| MatD::from_fn(u.count, v.count, |i, j| points[(c, i * v.count + j)]));
        Surface { u, v, grids, tolerance }
    }

    pub fn parametrization(&self, direction: Direction) -> &Parametrization {
        match direction {
            Direction::U => &self.u,
            Direction::V => &self.v,
        }
    }

    pub fn degree_u(&self) -> usize {
        self.u.p
    }

    pub fn degree_v(&self) -> usize {
        self.v.p
    }

    pub fn knots_u(&self) -> &VecD {
        &self.u.knots
    }

    pub fn knots_v(&self) -> &VecD {
        &self.v.knots
    }

    /// Returns the control points as columns, ordered row-major by their `(i, j)` grid index.
    pub fn control_points(&self) -> MatD {
        let count_v = self.v.count;
        MatD::from_fn(2, self.u.count * count_v, |c, k| self.grids[c][(k / count_v, k % count_v)])
    }

    /// Returns the control point `P_{i,j}`.
    pub fn control_point(&self, i: usize, j: usize) -> Point2 {
        Vector2::new(self.grids[0][(i, j)], self.grids[1][(i, j)])
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// The control points of coordinate `c` influencing the spans `(span_u, span_v)`.
    fn window(&self, c: usize, span_u: usize, span_v: usize) -> MatDView {
        let (p, q) = (self.u.p, self.v.p);
        self.grids[c].view((span_u - p, span_v - q), (p + 1, q + 1))
    }

    /// Evaluates the surface point `S(u, v)`.
    pub fn evaluate(&self, u: f64, v: f64) -> Result<Point2, SurfaceError> {
        let span_u = self.u.span(Direction::U, u)?;
        let span_v = self.v.span(Direction::V, v)?;

        let nu = basis_functions(span_u, u, self.u.p, &self.u.knots);
        let nv = basis_functions(span_v, v, self.v.p, &self.v.knots);

        Ok(Vector2::from_fn(|c, _| nu.dot(&(self.window(c, span_u, span_v) * &nv))))
    }

    /// Evaluates the surface at every `(u, v)` column of `params` and returns the points as columns.
    pub fn evaluate_points(&self, params: &MatD) -> Result<MatD, SurfaceError> {
        if params.nrows() != 2 {
            return Err(SurfaceError::ParameterShape { rows: params.nrows() });
        }

        let mut points = MatD::zeros(2, params.ncols());
        for (param, mut point) in params.column_iter().zip(points.column_iter_mut()) {
            point.copy_from(&self.evaluate(param[0], param[1])?);
        }
        Ok(points)
    }

    /// Returns the partial derivatives `∂^(k+l) S / ∂u^k ∂v^l` for `k ≤ order_u` and `l ≤ order_v`.
    ///
    /// The orders are clamped to the respective degree. Column `k * (order_v + 1) + l` of the returned
    /// `2 x (order_u + 1)(order_v + 1)` matrix holds the derivative of orders `(k, l)`,
    /// so column `0` is the surface point itself.
    pub fn derivatives(&self, u: f64, v: f64, order_u: usize, order_v: usize) -> Result<MatD, SurfaceError> {
        let order_u = order_u.min(self.u.p);
        let order_v = order_v.min(self.v.p);

        let span_u = self.u.span(Direction::U, u)?;
        let span_v = self.v.span(Direction::V, v)?;

        let ders_u = basis_function_derivatives(span_u, u, self.u.p, &self.u.knots, order_u);
        let ders_v = basis_function_derivatives(span_v, v, self.v.p, &self.v.knots, order_v);

        let windows = [0, 1].map(|c| self.window(c, span_u, span_v));

        let mut ders = MatD::zeros(2, (order_u + 1) * (order_v + 1));
        for k in 0..=order_u {
            for l in 0..=order_v {
                let index = k * (order_v + 1) + l;
                for (c, window) in windows.iter().enumerate() {
                    ders[(c, index)] = ders_u.column(k).dot(&(window * ders_v.column(l)));
                }
            }
        }
        Ok(ders)
    }

    /// Same as [`Surface::derivatives`], but every derivative is scaled to unit length.
    ///
    /// The surface point in column `0` and derivatives with a norm close to zero are left untouched.
    /// The magnitudes of the derivatives are lost, only their directions remain.
    pub fn derivative_directions(
        &self,
        u: f64,
        v: f64,
        order_u: usize,
        order_v: usize,
    ) -> Result<MatD, SurfaceError> {
        let mut ders = self.derivatives(u, v, order_u, order_v)?;

        for mut der in ders.column_iter_mut().skip(1) {
            let norm = der.norm();
            if !self.tolerance.is_zero(norm) {
                der.unscale_mut(norm);
            }
        }
        Ok(ders)
    }

    /// Returns either [`Surface::derivative_directions`] or the raw [`Surface::derivatives`].
    pub fn evaluate_derivatives(
        &self,
        u: f64,
        v: f64,
        order_u: usize,
        order_v: usize,
        normalize: bool,
    ) -> Result<MatD, SurfaceError> {
        if normalize {
            self.derivative_directions(u, v, order_u, order_v)
        } else {
            self.derivatives(u, v, order_u, order_v)
        }
    }
}
