//! **speckle-splines** is a library of the numerical building blocks of digital image correlation, built on
//! [nalgebra].
//!
//! It maps discrete images and deformable meshes into continuous coordinates.
//!
//! ## Features
//! - [Knot vector utilities][knots] to validate, normalize, and search knot vectors.
//! - Evaluation of [B-spline basis functions][basis] and all their derivatives `k = 0, 1,... , p`.
//! - [Knot insertion][manipulation::insert] refining curves of any dimension without changing their shape.
//! - Two-dimensional tensor-product [B-spline surfaces][surface] with their partial derivatives.
//! - Sub-pixel [image interpolation][image] with bicubic polynomials.
//! - Four-node [bilinear elements][element] and their deformation gradients.
//! - The zero-normalized sum of squared differences as [similarity measure][metric] between image subsets.
//!
//! ## What are B-Splines?
//!
//! B-splines are parametric functions composed of piecewise polynomials with a polynomial degree `p > 0`.
//! These piecewise polynomials are joined so that the parametric function is `p-1` times continuously
//! differentiable. The functions are parametrized over finite domains. A surface uses one parameter and
//! one basis per direction and combines them as a tensor product over a grid of control points.
//!
//! Only local polynomial segments must be considered in an evaluation, so evaluations and refinements
//! are fast and numerically stable.
//!
//! ## Example
//!
//! ```
//! use speckle_splines::{knots::generate_uniform_clamped, surface::Surface, types::MatD};
//!
//! let count = 4;
//! let points = MatD::from_fn(2, count * count, |c, k| if c == 0 { (k / count) as f64 } else { (k % count) as f64 });
//!
//! let surface = Surface::builder()
//!     .degree_u(3)
//!     .and_then(|b| b.degree_v(3))
//!     .and_then(|b| b.control_point_count_u(count))
//!     .and_then(|b| b.control_point_count_v(count))
//!     .and_then(|b| b.control_points(points))
//!     .and_then(|b| b.knots_u(generate_uniform_clamped(3, count)))
//!     .and_then(|b| b.knots_v(generate_uniform_clamped(3, count)))
//!     .and_then(|b| b.build())?;
//!
//! let point = surface.evaluate(0.5, 0.5)?;
//! assert!((point.x - 1.5).abs() < 1e-12);
//! # Ok::<(), speckle_splines::surface::SurfaceError>(())
//! ```
//!
//! ## Literature:
//! |            |                                                                                                                         |
//! |-----------:|:------------------------------------------------------------------------------------------------------------------------|
//! | Piegl1997  | Piegl, L., Tiller, W. The NURBS Book. Monographs in Visual Communication. Springer, Berlin, Heidelberg, 2nd ed., 1997.   |
//! | Pan2009    | Pan, B., Qian, K., Xie, H., Asundi, A., Two-dimensional digital image correlation for in-plane displacement and strain measurement: a review, Meas. Sci. Technol., 20(6) (2009) 062001. |

pub mod basis;
pub mod element;
pub mod image;
pub mod knots;
pub mod manipulation;
pub mod metric;
pub mod surface;
pub mod tolerance;
pub mod types;
