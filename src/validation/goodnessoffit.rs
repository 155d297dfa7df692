//! Chi-square goodness-of-fit check for sampled variates.
//!
//! Expected counts come from whatever density the caller supplies. Checking a sampler
//! against the density that generated its grid (the ground truth) and against the
//! fitted spline density are different questions; pick the density accordingly.

use statrs::distribution::{
    ChiSquared,
    ContinuousCDF
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GoodnessOfFitError {
    #[error("invalid binning: {0}")]
    InvalidBinning(String),
    #[error("no variates supplied")]
    EmptySample
}

/// Equal-width histogram over `[lower, upper]`; the upper bound falls in the last bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    lower: f64,
    upper: f64,
    counts: Vec<u64>,
    out_of_range: u64
}

impl Histogram {
    pub fn new(
        values: &[f64],
        bins: usize,
        lower: f64,
        upper: f64,
    ) -> Result<Histogram, GoodnessOfFitError> {
        if bins == 0 {
            return Err(GoodnessOfFitError::InvalidBinning("bin count must be positive".to_owned()));
        }
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(GoodnessOfFitError::InvalidBinning(format!(
                "bounds [{lower}, {upper}] do not form a finite interval"
            )));
        }

        let width = (upper - lower) / bins as f64;
        let mut counts = vec![0_u64; bins];
        let mut out_of_range = 0_u64;
        for &v in values {
            if !(lower..=upper).contains(&v) {
                out_of_range += 1;
                continue;
            }
            let i = (((v - lower) / width) as usize).min(bins - 1);
            counts[i] += 1;
        }
        Ok(Histogram { lower, upper, counts, out_of_range })
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len() as f64
    }

    pub fn edges(&self) -> Vec<f64> {
        let width = self.width();
        (0..=self.counts.len())
            .map(|i| self.lower + width * i as f64)
            .collect()
    }

    pub fn centers(&self) -> Vec<f64> {
        let width = self.width();
        (0..self.counts.len())
            .map(|i| self.lower + width * (i as f64 + 0.5))
            .collect()
    }

    /// Values that fell outside `[lower, upper]`.
    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    pub fn in_range(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareTest {
    statistic: f64,
    degrees_of_freedom: usize,
    p_value: f64,
    histogram: Histogram,
    expected: Vec<f64>
}

impl ChiSquareTest {
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Expected count per bin, `n · density(center) · width`.
    pub fn expected(&self) -> &[f64] {
        &self.expected
    }

    /// True when the null hypothesis is rejected at significance `alpha`.
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Bins `samples`, compares against `n · density(center) · width` per bin and returns
/// the chi-square statistic with its upper-tail p-value.
///
/// Bins with a non-positive expected count are left out of both the statistic and the
/// degrees of freedom (`contributing bins - 1`).
pub fn chi_square_test<F>(
    samples: &[f64],
    density: F,
    bins: usize,
    lower: f64,
    upper: f64,
) -> Result<ChiSquareTest, GoodnessOfFitError>
where
    F: Fn(f64) -> f64,
{
    if samples.is_empty() {
        return Err(GoodnessOfFitError::EmptySample);
    }
    if bins < 2 {
        return Err(GoodnessOfFitError::InvalidBinning(format!(
            "at least 2 bins are required, got {bins}"
        )));
    }
    let histogram = Histogram::new(samples, bins, lower, upper)?;

    let n = samples.len() as f64;
    let width = histogram.width();
    let expected: Vec<f64> = histogram
        .centers()
        .into_iter()
        .map(|center| n * density(center) * width)
        .collect();

    let mut statistic = 0.0;
    let mut contributing = 0_usize;
    for (&observed, &e) in histogram.counts().iter().zip(expected.iter()) {
        if e > 0.0 {
            let diff = observed as f64 - e;
            statistic += diff * diff / e;
            contributing += 1;
        }
    }
    if contributing < 2 {
        return Err(GoodnessOfFitError::InvalidBinning(format!(
            "only {contributing} bins have a positive expected count"
        )));
    }

    let degrees_of_freedom = contributing - 1;
    let chi_squared = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|error| GoodnessOfFitError::InvalidBinning(error.to_string()))?;
    let p_value = chi_squared.sf(statistic);

    debug!(
        statistic,
        degrees_of_freedom,
        p_value,
        out_of_range = histogram.out_of_range(),
        "chi-square test"
    );

    Ok(ChiSquareTest { statistic, degrees_of_freedom, p_value, histogram, expected })
}
