//! Four-node bilinear quadrilateral elements.
//!
//! The element maps the parametric square `[-1, 1]²` with coordinates `(xi, eta)` onto a
//! quadrilateral. The nodes are numbered counter-clockwise starting at `(-1, -1)`:
//!
//! ```text
//! (-1, 1) 3 ------ 2 (1, 1)
//!         |        |
//!         |        |
//! (-1,-1) 0 ------ 1 (1,-1)
//! ```

use nalgebra::{Matrix2, Matrix2x4, Vector4};
use thiserror::Error;

use crate::types::Point2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("The Jacobian of the element is singular at `(xi, eta) = ({xi}, {eta})`.")]
    SingularJacobian { xi: f64, eta: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BilinearElement {
    nodes: Matrix2x4<f64>,
}

impl BilinearElement {
    /// Creates an element from its four nodes given as columns.
    pub fn new(nodes: Matrix2x4<f64>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &Matrix2x4<f64> {
        &self.nodes
    }

    /// The values of the four shape functions at `(xi, eta)`.
    pub fn shape_functions(xi: f64, eta: f64) -> Vector4<f64> {
        Vector4::new(
            0.25 * (xi - 1.0) * (eta - 1.0),
            0.25 * (xi + 1.0) * (1.0 - eta),
            0.25 * (xi + 1.0) * (eta + 1.0),
            0.25 * (1.0 - xi) * (eta + 1.0),
        )
    }

    /// The derivatives of the shape functions with respect to `xi` (first row) and `eta` (second row).
    #[rustfmt::skip]
    pub fn shape_function_derivatives(xi: f64, eta: f64) -> Matrix2x4<f64> {
        0.25 * Matrix2x4::new(
            eta - 1.0, 1.0 - eta, eta + 1.0, -eta - 1.0,
            xi - 1.0,  -xi - 1.0, xi + 1.0,  1.0 - xi,
        )
    }

    /// Maps the parametric point `(xi, eta)` onto the element.
    pub fn point_at(&self, xi: f64, eta: f64) -> Point2 {
        self.nodes * Self::shape_functions(xi, eta)
    }

    /// The Jacobian `J_ab = ∂x_b / ∂ξ_a` of the mapping at `(xi, eta)`.
    pub fn jacobian(&self, xi: f64, eta: f64) -> Matrix2<f64> {
        Self::shape_function_derivatives(xi, eta) * self.nodes.transpose()
    }

    /// The deformation gradient `F = I + ∂u/∂X` at `(xi, eta)`.
    ///
    /// `displacements` holds the displacement of each node as a column.
    pub fn deformation_gradient_at(
        &self,
        xi: f64,
        eta: f64,
        displacements: &Matrix2x4<f64>,
    ) -> Result<Matrix2<f64>, ElementError> {
        let inverse = self.jacobian(xi, eta).try_inverse().ok_or(ElementError::SingularJacobian { xi, eta })?;

        // derivatives of the shape functions with respect to the reference coordinates
        let gradients = inverse * Self::shape_function_derivatives(xi, eta);

        Ok(Matrix2::identity() + displacements * gradients.transpose())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::matrix;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn unit_square() -> BilinearElement {
        BilinearElement::new(matrix![
            0.0, 1.0, 1.0, 0.0;
            0.0, 0.0, 1.0, 1.0;
        ])
    }

    #[rstest]
    #[case(-1.0, -1.0, 0)]
    #[case(1.0, -1.0, 1)]
    #[case(1.0, 1.0, 2)]
    #[case(-1.0, 1.0, 3)]
    fn maps_corners_onto_nodes(unit_square: BilinearElement, #[case] xi: f64, #[case] eta: f64, #[case] node: usize) {
        assert_relative_eq!(unit_square.point_at(xi, eta), unit_square.nodes().column(node).clone_owned());
    }

    #[rstest]
    fn maps_center(unit_square: BilinearElement) {
        assert_relative_eq!(unit_square.point_at(0.0, 0.0), Point2::new(0.5, 0.5));
    }

    #[rstest]
    fn partition_of_unity(#[values(-1.0, -0.3, 0.0, 0.8)] xi: f64, #[values(-1.0, 0.25, 1.0)] eta: f64) {
        assert_relative_eq!(BilinearElement::shape_functions(xi, eta).sum(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(
            BilinearElement::shape_function_derivatives(xi, eta).column_sum(),
            Point2::zeros(),
            epsilon = 1e-15
        );
    }

    #[rstest]
    fn jacobian_of_scaled_square() {
        let element = BilinearElement::new(matrix![
            0.0, 4.0, 4.0, 0.0;
            0.0, 0.0, 2.0, 2.0;
        ]);
        assert_relative_eq!(element.jacobian(0.3, -0.6), matrix![2.0, 0.0; 0.0, 1.0]);
    }

    #[rstest]
    #[case(matrix![1.1, 0.0; 0.0, 1.0])]
    #[case(matrix![1.1, 0.2; 0.05, 0.9])]
    #[case(matrix![1.0, 0.0; 0.0, 1.0])]
    fn recovers_homogeneous_deformation(
        unit_square: BilinearElement,
        #[case] expected: Matrix2<f64>,
        #[values((0.0, 0.0), (0.5, -0.75), (-1.0, 1.0))] at: (f64, f64),
    ) {
        let nodes = unit_square.nodes();
        let displacements = expected * nodes - nodes;

        let (xi, eta) = at;
        assert_relative_eq!(
            unit_square.deformation_gradient_at(xi, eta, &displacements).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[rstest]
    fn singular_jacobian() {
        let degenerate = BilinearElement::new(matrix![
            0.0, 1.0, 2.0, 3.0;
            0.0, 1.0, 2.0, 3.0;
        ]);
        assert_eq!(
            degenerate.deformation_gradient_at(0.0, 0.0, &Matrix2x4::zeros()),
            Err(ElementError::SingularJacobian { xi: 0.0, eta: 0.0 })
        );
    }
}
