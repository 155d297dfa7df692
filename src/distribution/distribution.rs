use rand::Rng;

use crate::configuration::DistributionConfiguration;
use crate::distribution::cdfbuilder::{
    build_cdf,
    CdfTable
};
use crate::distribution::distributionerror::DistributionError;
use crate::distribution::quantilebuilder::build_quantile;
use crate::distribution::sampler;
use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PiecewisePolynomial;

pub const DEFAULT_DEGREE: u8 = 3;

/// Continuous distribution fitted to tabulated density samples.
///
/// Holds three interpolants: the density, its CDF and the quantile function obtained
/// by inverting the monotone part of the CDF. All of them extend their outermost
/// polynomial pieces beyond the fitted range; evaluating there is allowed but not
/// accurate.
#[derive(Debug, Clone)]
pub struct Distribution {
    density: PiecewisePolynomial,
    cdf_table: CdfTable,
    cdf: PiecewisePolynomial,
    mask: Vec<bool>,
    quantile: PiecewisePolynomial
}

impl Distribution {
    pub fn new(x: &[f64], y: &[f64], degree: u8) -> Result<Distribution, DistributionError> {
        let points = Point2D::zip_grid(x, y)?;
        let density = PiecewisePolynomial::interpolate(&points, degree)?;
        let (cdf_table, cdf) = build_cdf(&density, x)?;
        let (mask, quantile) = build_quantile(&cdf_table, degree)?;
        Ok(Distribution { density, cdf_table, cdf, mask, quantile })
    }

    pub fn with_default_degree(x: &[f64], y: &[f64]) -> Result<Distribution, DistributionError> {
        Self::new(x, y, DEFAULT_DEGREE)
    }

    pub fn from_configuration(
        configuration: &DistributionConfiguration,
    ) -> Result<Distribution, DistributionError> {
        let (x, y) = configuration.grid.samples();
        Self::new(&x, &y, configuration.degree)
    }

    /// Density at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.density.value(x)
    }

    pub fn cdf(&self, x: f64) -> f64 {
        self.cdf.value(x)
    }

    pub fn quantile(&self, p: f64) -> f64 {
        self.quantile.value(p)
    }

    /// `cdf(x2) - cdf(x1)`. Arguments are not reordered, so `x1 > x2` gives a negative value.
    pub fn probability(&self, x1: f64, x2: f64) -> f64 {
        self.cdf(x2) - self.cdf(x1)
    }

    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        sampler::sample(&self.quantile, n, rng)
    }

    pub fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        sampler::sample_one(&self.quantile, rng)
    }

    pub fn degree(&self) -> u8 {
        self.density.degree()
    }

    pub fn min_x(&self) -> f64 {
        self.density.min_x()
    }

    pub fn max_x(&self) -> f64 {
        self.density.max_x()
    }

    pub fn density(&self) -> &PiecewisePolynomial {
        &self.density
    }

    pub fn cdf_curve(&self) -> &PiecewisePolynomial {
        &self.cdf
    }

    pub fn quantile_curve(&self) -> &PiecewisePolynomial {
        &self.quantile
    }

    pub fn cdf_table(&self) -> &CdfTable {
        &self.cdf_table
    }

    /// Which CDF table entries were used to fit the quantile curve.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Probability range covered by the quantile fit.
    pub fn quantile_domain(&self) -> (f64, f64) {
        (self.quantile.min_x(), self.quantile.max_x())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gaussian_grid(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| -3.0 + 6.0 * i as f64 / (n - 1) as f64).collect();
        let y = x
            .iter()
            .map(|&v| (-v * v).exp() / std::f64::consts::PI.sqrt())
            .collect();
        (x, y)
    }

    #[test]
    fn test_cdf_bounds() {
        let (x, y) = gaussian_grid(101);
        let dist = Distribution::with_default_degree(&x, &y).unwrap();
        assert_abs_diff_eq!(dist.cdf(-3.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dist.cdf(3.0), 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(dist.cdf(0.0), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_density_matches_samples() {
        let (x, y) = gaussian_grid(101);
        let dist = Distribution::with_default_degree(&x, &y).unwrap();
        assert_abs_diff_eq!(dist.evaluate(0.2), (-0.04_f64).exp() / std::f64::consts::PI.sqrt(), epsilon = 1e-5);
        assert_abs_diff_eq!(dist.evaluate(0.6), (-0.36_f64).exp() / std::f64::consts::PI.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_probability_is_cdf_difference() {
        let (x, y) = gaussian_grid(101);
        let dist = Distribution::with_default_degree(&x, &y).unwrap();
        assert_eq!(dist.probability(0.2, 0.8), dist.cdf(0.8) - dist.cdf(0.2));
        assert!(dist.probability(0.8, 0.2) < 0.0);
        // (erf(0.8) - erf(0.2)) / 2
        assert_abs_diff_eq!(dist.probability(0.2, 0.8), 0.2597, epsilon = 1e-3);
    }

    #[test]
    fn test_quantile_inverts_cdf() {
        let (x, y) = gaussian_grid(101);
        let dist = Distribution::with_default_degree(&x, &y).unwrap();
        for &v in &[-1.5, -0.4, 0.0, 0.9, 1.8] {
            assert_abs_diff_eq!(dist.quantile(dist.cdf(v)), v, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_mask_drops_only_last_for_positive_density() {
        let (x, y) = gaussian_grid(41);
        let dist = Distribution::with_default_degree(&x, &y).unwrap();
        let mask = dist.mask();
        assert_eq!(mask.len(), x.len());
        assert!(!mask[mask.len() - 1]);
        assert!(mask[..mask.len() - 1].iter().all(|&m| m));
        let (p_lo, p_hi) = dist.quantile_domain();
        assert_eq!(p_lo, 0.0);
        assert!(p_hi < 1.0);
    }

    #[test]
    fn test_invalid_degree_is_rejected() {
        let (x, y) = gaussian_grid(21);
        assert_eq!(Distribution::new(&x, &y, 0).err(), Some(DistributionError::InvalidDegree(0)));
        assert_eq!(Distribution::new(&x, &y, 6).err(), Some(DistributionError::InvalidDegree(6)));
    }

    #[test]
    fn test_short_grid_is_rejected() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.2, 0.5, 0.3];
        assert!(matches!(Distribution::new(&x, &y, 3), Err(DistributionError::InvalidGrid(_))));
        // the density fits, but masking always drops the last CDF point
        assert_eq!(
            Distribution::new(&x, &y, 2).err(),
            Some(DistributionError::DegenerateDistribution { survivors: 2, required: 3 })
        );
        assert!(Distribution::new(&x, &y, 1).is_ok());
    }

    #[test]
    fn test_unsorted_grid_is_rejected() {
        let x = [0.0, 2.0, 1.0, 3.0, 4.0];
        let y = [0.1, 0.2, 0.3, 0.2, 0.1];
        assert!(matches!(Distribution::new(&x, &y, 3), Err(DistributionError::InvalidGrid(_))));
    }

    #[test]
    fn test_distribution_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Distribution>();
    }
}
