use crate::distribution::distributionerror::DistributionError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    x: f64,
    y: f64
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x: x, y: y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Zips matched abscissas and ordinates into points after checking the grid contract:
    /// same length, finite values, strictly increasing abscissas.
    pub fn zip_grid(x: &[f64], y: &[f64]) -> Result<Vec<Point2D>, DistributionError> {
        if x.len() != y.len() {
            return Err(DistributionError::InvalidGrid(format!(
                "abscissa and ordinate lengths differ ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        if let Some(i) = x.iter().zip(y.iter()).position(|(xi, yi)| !xi.is_finite() || !yi.is_finite()) {
            return Err(DistributionError::InvalidGrid(format!(
                "non-finite value at index {i}"
            )));
        }
        if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(DistributionError::InvalidGrid(format!(
                "abscissas not strictly increasing at index {} ({} -> {})",
                i + 1,
                x[i],
                x[i + 1]
            )));
        }
        Ok(x.iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| Point2D::new(xi, yi))
            .collect())
    }
}

pub trait NonparametricCurve {
    fn points(&self) -> Vec<Point2D>;

    fn min_x(&self) -> f64;

    fn max_x(&self) -> f64;
}
