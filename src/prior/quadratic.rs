//! Quadratic (Gaussian) prior

use crate::core::{ClassifyError, Result};
use crate::prior::Prior;

/// Gaussian prior: `penalty = sum((x_i - mean_i)^2 / (2 sigma_i^2))`.
///
/// One `(sigma, mean)` pair is shared by every parameter unless
/// per-parameter overrides are supplied; parameters beyond the override
/// list fall back to the shared pair.
#[derive(Debug, Clone)]
pub struct QuadraticPrior {
    sigma_sq: f64,
    mean: f64,
    overrides: Option<Vec<(f64, f64)>>,
}

impl QuadraticPrior {
    /// Create a zero-mean Gaussian prior with shared standard deviation
    pub fn new(sigma: f64) -> Result<Self> {
        Self::with_mean(sigma, 0.0)
    }

    /// Create a Gaussian prior with shared standard deviation and mean
    pub fn with_mean(sigma: f64, mean: f64) -> Result<Self> {
        if sigma <= 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Prior sigma must be positive, got {sigma}"
            )));
        }
        Ok(Self {
            sigma_sq: sigma * sigma,
            mean,
            overrides: None,
        })
    }

    /// Create a Gaussian prior with one `(sigma, mean)` pair per parameter.
    ///
    /// Parameters past the end of `pairs` use `(shared_sigma, shared_mean)`.
    pub fn per_parameter(
        shared_sigma: f64,
        shared_mean: f64,
        pairs: Vec<(f64, f64)>,
    ) -> Result<Self> {
        let mut prior = Self::with_mean(shared_sigma, shared_mean)?;
        for &(sigma, _) in &pairs {
            if sigma <= 0.0 {
                return Err(ClassifyError::InvalidParameter(format!(
                    "Prior sigma must be positive, got {sigma}"
                )));
            }
        }
        prior.overrides = Some(
            pairs
                .into_iter()
                .map(|(sigma, mean)| (sigma * sigma, mean))
                .collect(),
        );
        Ok(prior)
    }

    /// `(sigma^2, mean)` in effect for parameter `i`
    fn params(&self, i: usize) -> (f64, f64) {
        if let Some(overrides) = &self.overrides {
            if let Some(&pair) = overrides.get(i) {
                return pair;
            }
        }
        (self.sigma_sq, self.mean)
    }
}

impl Prior for QuadraticPrior {
    fn compute(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        debug_assert_eq!(x.len(), grad.len());
        let mut penalty = 0.0;
        for (i, &w) in x.iter().enumerate() {
            let (sigma_sq, mean) = self.params(i);
            let centered = w - mean;
            penalty += centered * centered / (2.0 * sigma_sq);
            grad[i] += centered / sigma_sq;
        }
        penalty
    }
}
