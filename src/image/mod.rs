//! Sub-pixel sampling of grayscale images.
//!
//! Images are stored as matrices of pixel values with the row index pointing down. A position
//! `(row, col)` with integer coordinates is the center of the corresponding pixel.
//!
//! Interpolation is restricted to the interior of an image, which excludes a border of [`MARGIN`] pixels.

use thiserror::Error;

use crate::types::MatD;

pub mod bicubic;

pub use bicubic::BicubicInterpolator;

/// The number of border pixels without reliable gradient estimates.
///
/// The Sobel filter reaches one pixel into the zero padding, and the cross derivative filters twice.
pub const MARGIN: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    #[error(
        "The position `({row}, {col})` lies outside the interior `[{min}, {max_row}] x [{min}, {max_col}]` \
        of the image."
    )]
    OutOfBounds { row: f64, col: f64, min: f64, max_row: f64, max_col: f64 },

    #[error(
        "An image of shape `{rows} x {cols}` has no interior to interpolate. \
        At least `{required} x {required}` pixels are required."
    )]
    TooSmall { rows: usize, cols: usize, required: usize },
}

/// Evaluates an image at arbitrary positions between its pixel centers.
///
/// Evaluation takes `&mut self` so that implementations can cache intermediate results.
pub trait ImageInterpolator {
    fn evaluate(&mut self, row: f64, col: f64) -> Result<f64, ImageError>;
}

/// The image axis along which a gradient is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Col,
}

/// Applies the Sobel operator along `axis` with zero padding at the image border.
///
/// The result is the central difference along `axis` smoothed with the weights `[1, 2, 1]`
/// across it, so it equals eight times the derivative for linear intensities.
pub fn sobel(image: &MatD, axis: Axis) -> MatD {
    let (rows, cols) = image.shape();
    let pixel = |r: isize, c: isize| {
        if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
            0.0
        } else {
            image[(r as usize, c as usize)]
        }
    };

    MatD::from_fn(rows, cols, |r, c| {
        let (r, c) = (r as isize, c as isize);
        [(-1, 1.0), (0, 2.0), (1, 1.0)]
            .iter()
            .map(|&(offset, weight)| {
                let difference = match axis {
                    Axis::Row => pixel(r + 1, c + offset) - pixel(r - 1, c + offset),
                    Axis::Col => pixel(r + offset, c + 1) - pixel(r + offset, c - 1),
                };
                weight * difference
            })
            .sum()
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn sobel_of_linear_intensities() {
        let image = MatD::from_fn(5, 6, |r, c| 2.0 * r as f64 - 3.0 * c as f64);
        let rows = sobel(&image, Axis::Row);
        let cols = sobel(&image, Axis::Col);

        for r in 1..4 {
            for c in 1..5 {
                assert_relative_eq!(rows[(r, c)], 16.0);
                assert_relative_eq!(cols[(r, c)], -24.0);
            }
        }
    }

    #[rstest]
    fn sobel_pads_with_zeros() {
        let image = dmatrix![
            1.0, 1.0;
            1.0, 1.0;
        ];
        assert_eq!(sobel(&image, Axis::Row), dmatrix![3.0, 3.0; -3.0, -3.0]);
        assert_eq!(sobel(&image, Axis::Col), dmatrix![3.0, -3.0; 3.0, -3.0]);
    }
}
