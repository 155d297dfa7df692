use tracing::{
    debug,
    warn
};

use crate::distribution::distributionerror::DistributionError;
use crate::math::curve::curve::CurveIntegration;
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PiecewisePolynomial;

/// Deviation of the total fitted mass from one above which a warning is logged.
const MASS_TOLERANCE: f64 = 1e-3;

/// `(x_i, F(x_i))` with `F(x_i)` the density integral from the first abscissa.
#[derive(Debug, Clone, PartialEq)]
pub struct CdfTable {
    x: Vec<f64>,
    values: Vec<f64>
}

impl CdfTable {
    /// One closed-form integral per abscissa; `F(x_0)` is exactly zero.
    pub fn from_density(density: &PiecewisePolynomial, x: &[f64]) -> CdfTable {
        let values: Vec<f64> = match x.first() {
            Some(&x0) => x.iter().map(|&xi| density.integral(x0, xi)).collect(),
            None => Vec::new()
        };
        CdfTable { x: x.to_vec(), values }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `F` at the last abscissa.
    pub fn total_mass(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }

    pub fn points(&self) -> Vec<Point2D> {
        self.x
            .iter()
            .zip(self.values.iter())
            .map(|(&x, &f)| Point2D::new(x, f))
            .collect()
    }
}

/// Builds the CDF table and the interpolant through it.
///
/// Negative density samples are not rejected here; a locally decreasing `F` is left
/// for the quantile builder to mask out.
pub fn build_cdf(
    density: &PiecewisePolynomial,
    x: &[f64],
) -> Result<(CdfTable, PiecewisePolynomial), DistributionError> {
    let table = CdfTable::from_density(density, x);
    let curve = PiecewisePolynomial::interpolate(&table.points(), density.degree())?;

    let total_mass = table.total_mass();
    debug!(total_mass, points = table.len(), "cdf built");
    if (total_mass - 1.0).abs() > MASS_TOLERANCE {
        warn!(total_mass, "density does not integrate to one over the grid");
    }
    Ok((table, curve))
}
