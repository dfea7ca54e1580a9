//! Similarity measures between image subsets.

use thiserror::Error;

use crate::types::MatD;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("The subsets have different shapes `{f:?}` and `{g:?}`.")]
    ShapeMismatch { f: (usize, usize), g: (usize, usize) },

    #[error("The subsets are empty.")]
    Empty,

    #[error("The intensities of a subset do not vary, so it cannot be normalized.")]
    ZeroVariance,
}

/// Normalizes the intensities to zero mean and unit (population) standard deviation.
fn zero_normalized(subset: &MatD) -> Result<MatD, MetricError> {
    let mean = subset.mean();
    let deviation = subset.variance().sqrt();
    if deviation == 0.0 || !deviation.is_finite() {
        return Err(MetricError::ZeroVariance);
    }

    Ok(subset.map(|intensity| (intensity - mean) / deviation))
}

/// The zero-normalized sum of squared differences (ZNSSD)
///
/// `C = Σ ((f_i - f̄) / σ_f - (g_i - ḡ) / σ_g)²`
///
/// between the subsets `f` and `g`. The value lies in `[0, 4 n]` for `n` pixels and is insensitive
/// to offsets and scaling of the intensities. Zero indicates a perfect match.
pub fn zero_normalized_ssd(f: &MatD, g: &MatD) -> Result<f64, MetricError> {
    if f.shape() != g.shape() {
        return Err(MetricError::ShapeMismatch { f: f.shape(), g: g.shape() });
    }
    if f.is_empty() {
        return Err(MetricError::Empty);
    }

    let difference = zero_normalized(f)? - zero_normalized(g)?;
    Ok(difference.norm_squared())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn subset() -> MatD {
        dmatrix![
            0.1, 0.5, 0.9;
            0.3, 0.8, 0.2;
            0.7, 0.4, 0.6;
        ]
    }

    #[rstest]
    fn identical_subsets(subset: MatD) {
        assert_relative_eq!(zero_normalized_ssd(&subset, &subset).unwrap(), 0.0);
    }

    #[rstest]
    #[case(1.0, 0.25)]
    #[case(2.5, -1.0)]
    #[case(0.1, 10.0)]
    fn insensitive_to_affine_intensity_changes(subset: MatD, #[case] scale: f64, #[case] offset: f64) {
        let g = subset.map(|intensity| scale * intensity + offset);
        assert_relative_eq!(zero_normalized_ssd(&subset, &g).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[rstest]
    fn inverted_subset_is_maximal(subset: MatD) {
        let inverted = subset.map(|intensity| -intensity);
        assert_relative_eq!(zero_normalized_ssd(&subset, &inverted).unwrap(), 4.0 * 9.0, epsilon = 1e-12);
    }

    #[rstest]
    fn different_subsets(subset: MatD) {
        let g = subset.transpose();
        let c = zero_normalized_ssd(&subset, &g).unwrap();
        assert!(c > 0.0 && c < 36.0);
        assert_relative_eq!(c, zero_normalized_ssd(&g, &subset).unwrap());
    }

    #[rstest]
    fn shape_mismatch(subset: MatD) {
        assert_eq!(
            zero_normalized_ssd(&subset, &MatD::zeros(2, 3)),
            Err(MetricError::ShapeMismatch { f: (3, 3), g: (2, 3) })
        );
    }

    #[rstest]
    fn empty() {
        assert_eq!(zero_normalized_ssd(&MatD::zeros(0, 0), &MatD::zeros(0, 0)), Err(MetricError::Empty));
    }

    #[rstest]
    fn zero_variance(subset: MatD) {
        assert_eq!(zero_normalized_ssd(&subset, &MatD::repeat(3, 3, 0.5)), Err(MetricError::ZeroVariance));
    }
}
