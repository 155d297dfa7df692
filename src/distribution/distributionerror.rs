use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// Abscissas not strictly increasing, too few points, mismatched or non-finite input.
    #[error("invalid sample grid: {0}")]
    InvalidGrid(String),
    #[error("unsupported spline degree {0} (expected 1 to 5)")]
    InvalidDegree(u8),
    /// Too few strictly increasing CDF points survive masking to invert the CDF.
    #[error("degenerate distribution: {survivors} monotone CDF points, {required} required")]
    DegenerateDistribution {
        survivors: usize,
        required: usize
    }
}
