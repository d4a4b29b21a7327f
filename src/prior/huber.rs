//! Huber prior

use crate::core::{ClassifyError, Result};
use crate::prior::Prior;

/// Huber prior: quadratic within `±epsilon` of zero, linear beyond.
///
/// The two pieces meet continuously at the boundary
/// (`epsilon^2 / (2 epsilon sigma^2) = (epsilon - epsilon/2) / sigma^2`),
/// giving L1-like behavior for large weights without the kink at zero.
#[derive(Debug, Clone)]
pub struct HuberPrior {
    sigma_sq: f64,
    epsilon: f64,
}

impl HuberPrior {
    /// Create a Huber prior with the given sigma and quadratic half-width
    pub fn new(sigma: f64, epsilon: f64) -> Result<Self> {
        if sigma <= 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Prior sigma must be positive, got {sigma}"
            )));
        }
        if epsilon <= 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Huber epsilon must be positive, got {epsilon}"
            )));
        }
        Ok(Self {
            sigma_sq: sigma * sigma,
            epsilon,
        })
    }
}

impl Prior for HuberPrior {
    fn compute(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        debug_assert_eq!(x.len(), grad.len());
        let mut penalty = 0.0;
        for (i, &w) in x.iter().enumerate() {
            let wabs = w.abs();
            if wabs < self.epsilon {
                penalty += w * w / (2.0 * self.epsilon * self.sigma_sq);
                grad[i] += w / (self.epsilon * self.sigma_sq);
            } else {
                penalty += (wabs - self.epsilon / 2.0) / self.sigma_sq;
                grad[i] += w.signum() / self.sigma_sq;
            }
        }
        penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_huber_quadratic_inside() {
        let prior = HuberPrior::new(1.0, 0.5).unwrap();
        let x = vec![0.2];
        let mut grad = vec![0.0];

        let penalty = prior.compute(&x, &mut grad);

        // 0.04 / (2 * 0.5) = 0.04
        assert_relative_eq!(penalty, 0.04, epsilon = 1e-12);
        assert_relative_eq!(grad[0], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_huber_linear_outside() {
        let prior = HuberPrior::new(1.0, 0.5).unwrap();
        let x = vec![2.0, -2.0];
        let mut grad = vec![0.0; 2];

        let penalty = prior.compute(&x, &mut grad);

        // Per weight: 2.0 - 0.25 = 1.75
        assert_relative_eq!(penalty, 3.5, epsilon = 1e-12);
        assert_eq!(grad[0], 1.0);
        assert_eq!(grad[1], -1.0);
    }

    #[test]
    fn test_huber_continuous_at_boundary() {
        let prior = HuberPrior::new(1.0, 0.5).unwrap();

        let mut grad = vec![0.0];
        let just_inside = prior.compute(&[0.5 - 1e-9], &mut grad);
        let mut grad = vec![0.0];
        let just_outside = prior.compute(&[0.5 + 1e-9], &mut grad);

        assert_relative_eq!(just_inside, just_outside, epsilon = 1e-6);
    }

    #[test]
    fn test_huber_rejects_bad_parameters() {
        assert!(HuberPrior::new(0.0, 0.1).is_err());
        assert!(HuberPrior::new(1.0, 0.0).is_err());
        assert!(HuberPrior::new(-1.0, 0.1).is_err());
    }
}
