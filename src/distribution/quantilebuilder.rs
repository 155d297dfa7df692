use tracing::{
    debug,
    warn
};

use crate::distribution::cdfbuilder::CdfTable;
use crate::distribution::distributionerror::DistributionError;
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PiecewisePolynomial;

/// `mask[i]` is true iff `values[i + 1] - values[i] > 0`.
///
/// The last entry has no successor and is always false, so the mask has exactly the
/// length of `values`.
pub fn monotonic_mask(values: &[f64]) -> Vec<bool> {
    let mut mask: Vec<bool> = values
        .windows(2)
        .map(|w| w[1] - w[0] > 0.0)
        .collect();
    if !values.is_empty() {
        mask.push(false);
    }
    mask
}

/// Fits `p ↦ x` over the masked `(F, x)` pairs of the table.
pub fn build_quantile(
    table: &CdfTable,
    degree: u8,
) -> Result<(Vec<bool>, PiecewisePolynomial), DistributionError> {
    let mask = monotonic_mask(table.values());
    let kept: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(i, _)| i)
        .collect();
    let points: Vec<Point2D> = kept
        .iter()
        .map(|&i| Point2D::new(table.values()[i], table.x()[i]))
        .collect();

    let survivors = points.len();
    let required = degree as usize + 1;
    let dropped = table.len() - survivors;
    debug!(survivors, dropped, "cdf masked for inversion");
    // the trailing point is always dropped
    if dropped > 1 {
        warn!(dropped = dropped - 1, "non-increasing cdf segments removed before inversion");
    }
    if survivors < required {
        return Err(DistributionError::DegenerateDistribution { survivors, required });
    }

    // forward differences alone do not order survivors across a deep dip
    if let Some(j) = points.windows(2).position(|w| w[1].x() <= w[0].x()) {
        let (lhs, rhs) = (kept[j], kept[j + 1]);
        return Err(DistributionError::InvalidGrid(format!(
            "masked cdf not strictly increasing between table indices {lhs} and {rhs} \
             ({} -> {}); density samples integrate to a negative mass there",
            table.values()[lhs],
            table.values()[rhs]
        )));
    }

    let quantile = PiecewisePolynomial::interpolate(&points, degree)?;
    Ok((mask, quantile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_drops_last_entry() {
        assert_eq!(monotonic_mask(&[0.0, 0.1, 0.3]), vec![true, true, false]);
    }

    #[test]
    fn test_mask_drops_flat_and_decreasing() {
        let values = [0.0, 0.2, 0.2, 0.1, 0.5, 0.9];
        assert_eq!(
            monotonic_mask(&values),
            vec![true, false, false, true, true, false]
        );
    }

    #[test]
    fn test_mask_edge_lengths() {
        assert!(monotonic_mask(&[]).is_empty());
        assert_eq!(monotonic_mask(&[0.4]), vec![false]);
    }

    #[test]
    fn test_flat_cdf_is_degenerate() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y = vec![0.0; 8];
        let points = Point2D::zip_grid(&x, &y).unwrap();
        let density = PiecewisePolynomial::interpolate(&points, 3).unwrap();
        let table = CdfTable::from_density(&density, &x);
        let result = build_quantile(&table, 3);
        assert_eq!(
            result.err(),
            Some(DistributionError::DegenerateDistribution { survivors: 0, required: 4 })
        );
    }

    #[test]
    fn test_deep_dip_reports_masked_cdf() {
        let x: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let y = vec![0.1, 0.2, -0.6, -0.6, 0.2, 0.25, 0.2, 0.1, 0.05];
        let points = Point2D::zip_grid(&x, &y).unwrap();
        let density = PiecewisePolynomial::interpolate(&points, 1).unwrap();
        let table = CdfTable::from_density(&density, &x);
        match build_quantile(&table, 1) {
            Err(DistributionError::InvalidGrid(message)) => {
                assert!(message.contains("masked cdf"), "{message}");
                assert!(message.contains("indices 1 and 4"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
