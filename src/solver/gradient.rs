//! Steepest-descent minimizer

use crate::core::{ClassifyError, Minimizer, MinimizerConfig, Objective, Result};
use crate::utils::math::norm;
use log::{info, warn};

/// Gradient descent with backtracking line search.
///
/// Far slower than the quasi-Newton minimizer on ill-conditioned
/// problems; kept as the second member of the factory's closed set and
/// as a debugging baseline.
pub struct GradientDescentMinimizer {
    config: MinimizerConfig,
}

impl GradientDescentMinimizer {
    /// Create a minimizer with the given configuration
    pub fn new(config: MinimizerConfig) -> Self {
        Self { config }
    }
}

impl Default for GradientDescentMinimizer {
    fn default() -> Self {
        Self::new(MinimizerConfig::default())
    }
}

impl Minimizer for GradientDescentMinimizer {
    fn minimize(
        &self,
        objective: &dyn Objective,
        tolerance: f64,
        initial: &[f64],
    ) -> Result<Vec<f64>> {
        if initial.len() != objective.domain_dimension() {
            return Err(ClassifyError::DimensionMismatch {
                expected: objective.domain_dimension(),
                actual: initial.len(),
            });
        }

        const ARMIJO_C: f64 = 1e-4;
        let mut x = initial.to_vec();
        let mut eval = objective.calculate(&x)?;
        let mut step = 1.0;

        for iteration in 0..self.config.max_iterations {
            let grad_norm = norm(&eval.gradient);
            if grad_norm <= tolerance * 1.0_f64.max(norm(&x)) {
                info!(
                    "Converged after {iteration} iterations (value {:.6}, |grad| {:.3e})",
                    eval.value, grad_norm
                );
                return Ok(x);
            }

            let mut accepted = None;
            let mut trial = step;
            for _ in 0..self.config.max_line_search_steps {
                let candidate: Vec<f64> = x
                    .iter()
                    .zip(eval.gradient.iter())
                    .map(|(xi, gi)| xi - trial * gi)
                    .collect();
                let cand_eval = objective.calculate(&candidate)?;
                if cand_eval.value <= eval.value - ARMIJO_C * trial * grad_norm * grad_norm {
                    accepted = Some((candidate, cand_eval, trial));
                    break;
                }
                trial *= 0.5;
            }

            match accepted {
                Some((next_x, next_eval, used)) => {
                    x = next_x;
                    eval = next_eval;
                    // Let the step grow back so a single hard iteration
                    // does not pin all later ones to a tiny step
                    step = (used * 2.0).min(1.0);
                }
                None => {
                    warn!("Line search failed at iteration {iteration}; returning current point");
                    return Ok(x);
                }
            }
        }

        warn!(
            "Reached max iterations ({}) with |grad| {:.3e}",
            self.config.max_iterations,
            norm(&eval.gradient)
        );
        Ok(x)
    }
}
