use tracing::debug;

use crate::distribution::distributionerror::DistributionError;
use crate::math::curve::curve::{
    Curve,
    CurveIntegration
};
use crate::math::curve::nonparametriccurve::bspline;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};

pub const MIN_DEGREE: u8 = 1;
pub const MAX_DEGREE: u8 = 5;

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Subpolynomial {
    coefs: Vec<f64>,
    deriv_coefs: Vec<f64>,
    antideriv_coefs: Vec<f64>,
    lhs_x: f64,
}

impl Subpolynomial {
    pub fn new(coefs: Vec<f64>, lhs_x: f64) -> Subpolynomial {
        let deriv_coefs = Self::compute_deriv_coefs(&coefs);
        let antideriv_coefs = Self::compute_antideriv_coefs(&coefs);
        Subpolynomial { coefs, deriv_coefs, antideriv_coefs, lhs_x }
    }

    fn compute_deriv_coefs(coefs: &[f64]) -> Vec<f64> {
        let order = coefs.len() - 1;
        if order == 0 {
            vec![0.0]
        } else {
            (0..order)
                .map(|i| (order - i) as f64 * coefs[i])
                .collect()
        }
    }

    /// Antiderivative vanishing at `lhs_x`.
    fn compute_antideriv_coefs(coefs: &[f64]) -> Vec<f64> {
        let order = coefs.len() - 1;
        coefs
            .iter()
            .enumerate()
            .map(|(i, &c)| c / (order - i + 1) as f64)
            .chain(std::iter::once(0.0))
            .collect()
    }

    pub fn value(&self, x: f64) -> f64 {
        self.evaluate(&self.coefs, x)
    }

    pub fn derivative(&self, x: f64) -> f64 {
        self.evaluate(&self.deriv_coefs, x)
    }

    pub fn antiderivative(&self, x: f64) -> f64 {
        self.evaluate(&self.antideriv_coefs, x)
    }

    fn evaluate(&self, coefs: &[f64], x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        let mut result = coefs[0];
        for &beta in &coefs[1..] {
            result = f64::mul_add(result, x_diff, beta);
        }
        result
    }
}

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

/// Interpolating spline of degree 1..=5 stored as one polynomial per knot interval.
///
/// Outside `[min_x, max_x]` the outermost pieces are extended as-is. The extension is
/// well defined but loses accuracy quickly; callers that evaluate out of range own
/// the consequences.
#[derive(Debug, Clone)]
pub struct PiecewisePolynomial {
    degree: u8,
    max_x: f64,
    subpolynomial_list: Vec<Subpolynomial>,
    /// integral from `min_x` to the left end of each piece
    cumulative_integrals: Vec<f64>,
}

impl PiecewisePolynomial {
    pub fn interpolate(
        points: &[Point2D],
        degree: u8,
    ) -> Result<PiecewisePolynomial, DistributionError> {
        if !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) {
            return Err(DistributionError::InvalidDegree(degree));
        }
        let k = degree as usize;
        if points.len() < k + 1 {
            return Err(DistributionError::InvalidGrid(format!(
                "degree {} needs at least {} points, got {}",
                degree,
                k + 1,
                points.len()
            )));
        }
        if let Some(i) = points.windows(2).position(|w| w[1].x() <= w[0].x()) {
            return Err(DistributionError::InvalidGrid(format!(
                "abscissas not strictly increasing at index {}",
                i + 1
            )));
        }

        let knots = bspline::generate_knots(points, k);
        let coefs = bspline::solve_coefficients(points, &knots, k).ok_or_else(|| {
            DistributionError::InvalidGrid("singular collocation system".to_owned())
        })?;

        let subpolynomial_list: Vec<Subpolynomial> = bspline::taylor_segments(&knots, &coefs, k)
            .into_iter()
            .map(|(lhs_x, taylor)| Subpolynomial::new(taylor, lhs_x))
            .collect();

        let mut cumulative_integrals = Vec::with_capacity(subpolynomial_list.len());
        let mut acc = 0.0;
        for (i, sub) in subpolynomial_list.iter().enumerate() {
            cumulative_integrals.push(acc);
            let rhs_x = subpolynomial_list
                .get(i + 1)
                .map_or(points[points.len() - 1].x(), |next| next.lhs_x);
            acc += sub.antiderivative(rhs_x);
        }

        debug!(
            degree,
            points = points.len(),
            segments = subpolynomial_list.len(),
            "spline fitted"
        );

        Ok(PiecewisePolynomial {
            degree,
            max_x: points[points.len() - 1].x(),
            subpolynomial_list,
            cumulative_integrals,
        })
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    /// NaN falls into the first piece and propagates through its polynomial.
    fn find_segment(&self, x: f64) -> usize {
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            self.subpolynomial_list.len() - 1
        } else {
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x)
                .saturating_sub(1)
        }
    }

    /// Integral from `min_x` to `x`.
    fn primitive(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.cumulative_integrals[i] + self.subpolynomial_list[i].antiderivative(x)
    }
}

// ─────────────────────────────────────────────
// Trait implementations
// ─────────────────────────────────────────────

impl NonparametricCurve for PiecewisePolynomial {
    /// Breakpoints of the piecewise representation with their fitted values.
    fn points(&self) -> Vec<Point2D> {
        let mut pts: Vec<Point2D> = self
            .subpolynomial_list
            .iter()
            .map(|s| Point2D::new(s.lhs_x, s.value(s.lhs_x)))
            .collect();
        if let Some(last) = self.subpolynomial_list.last() {
            pts.push(Point2D::new(self.max_x, last.value(self.max_x)));
        }
        pts
    }

    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}

impl Curve for PiecewisePolynomial {
    fn value(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].value(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].derivative(x)
    }
}

impl CurveIntegration for PiecewisePolynomial {
    fn integral(&self, a: f64, b: f64) -> f64 {
        if a == b {
            return 0.0;
        }
        self.primitive(b) - self.primitive(a)
    }
}
