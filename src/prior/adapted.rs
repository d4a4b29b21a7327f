//! Adapted prior: regularization centered on a reference model

use crate::prior::Prior;

/// Decorator evaluating an inner prior at `x - center`.
///
/// Shifts the regularization center to a previously trained weight
/// vector, so new training is pulled toward the reference model instead
/// of toward zero. Parameters beyond the center's length are treated as
/// centered at zero. The chain rule through the shift is the identity,
/// so the inner gradient passes through unchanged.
pub struct AdaptedPrior<P: Prior> {
    inner: P,
    center: Vec<f64>,
}

impl<P: Prior> AdaptedPrior<P> {
    /// Wrap `inner`, centering it on `center`
    pub fn new(inner: P, center: Vec<f64>) -> Self {
        Self { inner, center }
    }
}

impl<P: Prior> Prior for AdaptedPrior<P> {
    fn compute(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let shifted: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &w)| w - self.center.get(i).copied().unwrap_or(0.0))
            .collect();
        self.inner.compute(&shifted, grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prior::QuadraticPrior;
    use approx::assert_relative_eq;

    #[test]
    fn test_adapted_prior_vanishes_at_center() {
        let center = vec![1.0, -2.0];
        let prior = AdaptedPrior::new(QuadraticPrior::new(1.0).unwrap(), center.clone());
        let mut grad = vec![0.0; 2];

        assert_eq!(prior.compute(&center, &mut grad), 0.0);
        assert_eq!(grad, vec![0.0, 0.0]);
    }

    #[test]
    fn test_adapted_prior_penalizes_distance_from_center() {
        let prior = AdaptedPrior::new(QuadraticPrior::new(1.0).unwrap(), vec![1.0]);
        let mut grad = vec![0.0];

        let penalty = prior.compute(&[3.0], &mut grad);

        // Same as a zero-centered quadratic at x = 2
        assert_relative_eq!(penalty, 2.0, epsilon = 1e-12);
        assert_relative_eq!(grad[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_adapted_prior_short_center_pads_with_zero() {
        let prior = AdaptedPrior::new(QuadraticPrior::new(1.0).unwrap(), vec![1.0]);
        let mut grad = vec![0.0; 2];

        let penalty = prior.compute(&[1.0, 2.0], &mut grad);

        // First parameter sits at the center; second is zero-centered
        assert_relative_eq!(penalty, 2.0, epsilon = 1e-12);
        assert_eq!(grad[0], 0.0);
        assert_relative_eq!(grad[1], 2.0, epsilon = 1e-12);
    }
}
