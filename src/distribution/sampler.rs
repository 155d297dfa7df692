//! Inverse-transform sampling.
//!
//! The random source is always supplied by the caller. Use [`create_rng`] with a
//! fixed seed for reproducible draws.

use rand::Rng;
use tracing::debug;

use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PiecewisePolynomial;

/// Seeded `SmallRng`; the sequence is deterministic for a given seed.
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Maps one uniform draw in `[0, 1)` through the quantile curve.
pub fn sample_one<R: Rng + ?Sized>(quantile: &PiecewisePolynomial, rng: &mut R) -> f64 {
    let u: f64 = rng.random();
    quantile.value(u)
}

/// Draws exactly `n` variates.
pub fn sample<R: Rng + ?Sized>(quantile: &PiecewisePolynomial, n: usize, rng: &mut R) -> Vec<f64> {
    debug!(n, "sampling");
    (0..n).map(|_| sample_one(quantile, rng)).collect()
}
