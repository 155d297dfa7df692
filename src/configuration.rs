use std::fs::File;
use std::io::BufReader;

use serde::{
    Deserialize,
    Serialize
};
use thiserror::Error;

use crate::distribution::distribution::{
    Distribution,
    DEFAULT_DEGREE
};
use crate::distribution::distributionerror::DistributionError;
use crate::validation::goodnessoffit::GoodnessOfFitError;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    JsonParseError(#[from] serde_json::Error),
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    #[error(transparent)]
    GoodnessOfFit(#[from] GoodnessOfFitError)
}

/// Density samples the distribution is fitted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridConfiguration {
    Tabulated {
        x: Vec<f64>,
        y: Vec<f64>
    },
    /// `exp(-x²) / √π` sampled at `points` evenly spaced abscissas.
    Gaussian {
        lower: f64,
        upper: f64,
        points: usize
    }
}

impl GridConfiguration {
    pub fn reference_density(x: f64) -> f64 {
        (-x * x).exp() / std::f64::consts::PI.sqrt()
    }

    pub fn samples(&self) -> (Vec<f64>, Vec<f64>) {
        match self {
            GridConfiguration::Tabulated { x, y } => (x.clone(), y.clone()),
            GridConfiguration::Gaussian { lower, upper, points } => {
                let x: Vec<f64> = match *points {
                    0 => Vec::new(),
                    1 => vec![*lower],
                    n => (0..n)
                        .map(|i| lower + (upper - lower) * i as f64 / (n - 1) as f64)
                        .collect()
                };
                let y = x.iter().map(|&v| Self::reference_density(v)).collect();
                (x, y)
            }
        }
    }

    /// Domain spanned by the grid, if it has any points.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let (x, _) = self.samples();
        Some((*x.first()?, *x.last()?))
    }
}

impl Default for GridConfiguration {
    fn default() -> Self {
        GridConfiguration::Gaussian { lower: -3.0, upper: 3.0, points: 101 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfiguration {
    pub seed: u64,
    pub size: usize
}

impl Default for SamplingConfiguration {
    fn default() -> Self {
        SamplingConfiguration { seed: 0, size: 1_000_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoodnessOfFitConfiguration {
    pub bins: usize,
    pub alpha: f64
}

impl Default for GoodnessOfFitConfiguration {
    fn default() -> Self {
        GoodnessOfFitConfiguration { bins: 200, alpha: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfiguration {
    pub degree: u8,
    pub grid: GridConfiguration,
    pub sampling: SamplingConfiguration,
    pub goodness_of_fit: GoodnessOfFitConfiguration,
    pub log_level: String
}

impl Default for DistributionConfiguration {
    fn default() -> Self {
        DistributionConfiguration {
            degree: DEFAULT_DEGREE,
            grid: GridConfiguration::default(),
            sampling: SamplingConfiguration::default(),
            goodness_of_fit: GoodnessOfFitConfiguration::default(),
            log_level: "info".to_owned()
        }
    }
}

impl DistributionConfiguration {
    pub fn from_reader(file_path: &str) -> Result<DistributionConfiguration, ConfigurationError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let configuration = serde_json::from_reader(reader)?;
        Ok(configuration)
    }

    pub fn from_json_str(json: &str) -> Result<DistributionConfiguration, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> Result<Distribution, ConfigurationError> {
        Ok(Distribution::from_configuration(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let configuration = DistributionConfiguration::from_json_str("{}").unwrap();
        assert_eq!(configuration, DistributionConfiguration::default());
        assert_eq!(configuration.degree, 3);
        assert_eq!(configuration.goodness_of_fit.bins, 200);
    }

    #[test]
    fn test_tabulated_grid() {
        let json = r#"{
            "degree": 1,
            "grid": { "kind": "tabulated", "x": [0.0, 1.0, 2.0], "y": [0.5, 0.5, 0.5] },
            "sampling": { "seed": 9 }
        }"#;
        let configuration = DistributionConfiguration::from_json_str(json).unwrap();
        assert_eq!(configuration.sampling.seed, 9);
        assert_eq!(configuration.sampling.size, 1_000_000);
        assert_eq!(configuration.grid.bounds(), Some((0.0, 2.0)));
        let distribution = configuration.build().unwrap();
        assert!((distribution.cdf(1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_grid_samples() {
        let grid = GridConfiguration::Gaussian { lower: -3.0, upper: 3.0, points: 40 };
        let (x, y) = grid.samples();
        assert_eq!(x.len(), 40);
        assert_eq!(x[0], -3.0);
        assert_eq!(x[39], 3.0);
        assert!((y[0] - GridConfiguration::reference_density(-3.0)).abs() < 1e-15);
    }

    #[test]
    fn test_round_trip_through_json() {
        let configuration = DistributionConfiguration::default();
        let json = serde_json::to_string(&configuration).unwrap();
        let parsed = DistributionConfiguration::from_json_str(&json).unwrap();
        assert_eq!(parsed, configuration);
    }

    #[test]
    fn test_invalid_degree_surfaces_as_distribution_error() {
        let json = r#"{ "degree": 7 }"#;
        let configuration = DistributionConfiguration::from_json_str(json).unwrap();
        assert!(matches!(
            configuration.build(),
            Err(ConfigurationError::Distribution(DistributionError::InvalidDegree(7)))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            DistributionConfiguration::from_reader("/nonexistent/splinedist.json"),
            Err(ConfigurationError::IOError(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DistributionConfiguration::from_json_str("{ degree: }"),
            Err(ConfigurationError::JsonParseError(_))
        ));
    }
}
