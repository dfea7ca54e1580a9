use std::collections::HashMap;

use nalgebra::{Matrix4, Vector4};

use crate::{
    image::{sobel, Axis, ImageError, ImageInterpolator, MARGIN},
    types::MatD,
};

/// Maps the corner values and derivatives of a unit cell to the coefficients of the cubic.
#[rustfmt::skip]
fn hermite() -> Matrix4<f64> {
    Matrix4::new(
         1.0,  0.0,  0.0,  0.0,
         0.0,  0.0,  1.0,  0.0,
        -3.0,  3.0, -2.0, -1.0,
         2.0, -2.0,  1.0,  1.0,
    )
}

/// The upper left pixel of a unit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Cell {
    row: usize,
    col: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct Gradients {
    row: MatD,
    col: MatD,
    cross: MatD,
}

impl Gradients {
    /// Estimates unit-spacing derivatives with Sobel filters.
    fn new(image: &MatD) -> Self {
        let col = sobel(image, Axis::Col);
        let cross = sobel(&col, Axis::Row) / 64.0;
        Self { row: sobel(image, Axis::Row) / 8.0, col: col / 8.0, cross }
    }
}

/// Bicubic interpolation of an image.
///
/// Within each cell spanned by four neighboring pixels the intensity is the bicubic polynomial
/// `f(r, c) = Σ a_ij r^i c^j` matching the pixel values and the Sobel estimates of the first
/// derivatives and the cross derivative at the four corners. The interpolant is exact at pixel
/// centers and continuously differentiable across cells.
///
/// Only the interior of the image, without a border of [`MARGIN`] pixels, can be evaluated, as the
/// gradient estimates near the border are distorted by the zero padding.
///
/// Gradients are computed on the first evaluation and the coefficients of each cell are cached.
#[derive(Debug, Clone)]
pub struct BicubicInterpolator {
    image: MatD,
    gradients: Option<Gradients>,
    coefficients: HashMap<Cell, Matrix4<f64>>,
}

impl BicubicInterpolator {
    pub fn new(image: MatD) -> Result<Self, ImageError> {
        let (rows, cols) = image.shape();
        let required = 2 * MARGIN + 2;
        if rows < required || cols < required {
            return Err(ImageError::TooSmall { rows, cols, required });
        }

        Ok(Self { image, gradients: None, coefficients: HashMap::new() })
    }

    pub fn image(&self) -> &MatD {
        &self.image
    }

    fn check_bounds(&self, row: f64, col: f64) -> Result<(), ImageError> {
        let min = MARGIN as f64;
        let max_row = (self.image.nrows() - 1 - MARGIN) as f64;
        let max_col = (self.image.ncols() - 1 - MARGIN) as f64;

        // written so that `NaN` is rejected as well
        if !((min..=max_row).contains(&row) && (min..=max_col).contains(&col)) {
            return Err(ImageError::OutOfBounds { row, col, min, max_row, max_col });
        }
        Ok(())
    }

    /// Locates the cell containing a position. The last interior row and column belong to the preceding cell.
    fn cell(&self, row: f64, col: f64) -> Cell {
        Cell {
            row: (row.floor() as usize).min(self.image.nrows() - MARGIN - 2),
            col: (col.floor() as usize).min(self.image.ncols() - MARGIN - 2),
        }
    }

    fn coefficients(&mut self, cell: Cell) -> Matrix4<f64> {
        if let Some(coefficients) = self.coefficients.get(&cell) {
            return *coefficients;
        }

        let image = &self.image;
        let gradients = self.gradients.get_or_insert_with(|| Gradients::new(image));

        let corners = |field: &MatD| {
            [
                [field[(cell.row, cell.col)], field[(cell.row, cell.col + 1)]],
                [field[(cell.row + 1, cell.col)], field[(cell.row + 1, cell.col + 1)]],
            ]
        };
        let (f, f_r, f_c, f_rc) =
            (corners(image), corners(&gradients.row), corners(&gradients.col), corners(&gradients.cross));

        let values = Matrix4::from_fn(|i, j| {
            let (a, b) = (i % 2, j % 2);
            match (i < 2, j < 2) {
                (true, true) => f[a][b],
                (true, false) => f_c[a][b],
                (false, true) => f_r[a][b],
                (false, false) => f_rc[a][b],
            }
        });

        let hermite = hermite();
        let coefficients = hermite * values * hermite.transpose();
        log::trace!("computed bicubic coefficients of cell {:?}", cell);
        self.coefficients.insert(cell, coefficients);
        coefficients
    }
}

impl ImageInterpolator for BicubicInterpolator {
    fn evaluate(&mut self, row: f64, col: f64) -> Result<f64, ImageError> {
        self.check_bounds(row, col)?;

        let cell = self.cell(row, col);
        let r = row - cell.row as f64;
        let c = col - cell.col as f64;

        let rs = Vector4::new(1.0, r, r * r, r * r * r);
        let cs = Vector4::new(1.0, c, c * c, c * c * c);
        Ok(rs.dot(&(self.coefficients(cell) * cs)))
    }
}
