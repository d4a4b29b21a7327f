//! Quasi-Newton (L-BFGS) minimizer
//!
//! Limited-memory BFGS with the standard two-loop recursion and a
//! backtracking Armijo line search. This is the batch trainers' default
//! minimizer: objectives here are smooth and convex, so modest memory
//! and a simple line search converge quickly.

use crate::core::{ClassifyError, Evaluation, Minimizer, MinimizerConfig, Objective, Result};
use crate::utils::math::{dot, norm};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// L-BFGS minimizer over the `Objective` contract
pub struct QnMinimizer {
    config: MinimizerConfig,
}

impl QnMinimizer {
    /// Create a minimizer with the given configuration
    pub fn new(config: MinimizerConfig) -> Self {
        Self { config }
    }

    /// Search direction from the two-loop recursion over stored
    /// curvature pairs; falls back to steepest descent with no history
    fn direction(
        &self,
        gradient: &[f64],
        history: &VecDeque<(Vec<f64>, Vec<f64>, f64)>,
    ) -> Vec<f64> {
        let mut q = gradient.to_vec();
        let mut alphas = Vec::with_capacity(history.len());

        for (s, y, rho) in history.iter().rev() {
            let alpha = rho * dot(s, &q);
            for (qi, yi) in q.iter_mut().zip(y.iter()) {
                *qi -= alpha * yi;
            }
            alphas.push(alpha);
        }

        if let Some((s, y, _)) = history.back() {
            let gamma = dot(s, y) / dot(y, y);
            for qi in q.iter_mut() {
                *qi *= gamma;
            }
        }

        for ((s, y, rho), alpha) in history.iter().zip(alphas.into_iter().rev()) {
            let beta = rho * dot(y, &q);
            for (qi, si) in q.iter_mut().zip(s.iter()) {
                *qi += (alpha - beta) * si;
            }
        }

        for qi in q.iter_mut() {
            *qi = -*qi;
        }
        q
    }

    /// Backtracking line search satisfying the Armijo condition.
    ///
    /// Returns the accepted point and its evaluation, or `None` if no
    /// step length produced sufficient decrease.
    fn line_search(
        &self,
        objective: &dyn Objective,
        x: &[f64],
        eval: &Evaluation,
        direction: &[f64],
        dir_deriv: f64,
        initial_step: f64,
    ) -> Result<Option<(Vec<f64>, Evaluation)>> {
        const ARMIJO_C: f64 = 1e-4;
        let mut step = initial_step;

        for _ in 0..self.config.max_line_search_steps {
            let candidate: Vec<f64> = x
                .iter()
                .zip(direction.iter())
                .map(|(xi, di)| xi + step * di)
                .collect();
            let cand_eval = objective.calculate(&candidate)?;

            if cand_eval.value <= eval.value + ARMIJO_C * step * dir_deriv {
                return Ok(Some((candidate, cand_eval)));
            }
            step *= 0.5;
        }

        Ok(None)
    }
}

impl Default for QnMinimizer {
    fn default() -> Self {
        Self::new(MinimizerConfig::default())
    }
}

impl Minimizer for QnMinimizer {
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

        let mut x = initial.to_vec();
        let mut eval = objective.calculate(&x)?;
        // (s, y, 1 / y.s) curvature pairs, oldest first
        let mut history: VecDeque<(Vec<f64>, Vec<f64>, f64)> =
            VecDeque::with_capacity(self.config.memory);

        for iteration in 0..self.config.max_iterations {
            let grad_norm = norm(&eval.gradient);
            if grad_norm <= tolerance * 1.0_f64.max(norm(&x)) {
                info!(
                    "Converged after {iteration} iterations (value {:.6}, |grad| {:.3e})",
                    eval.value, grad_norm
                );
                return Ok(x);
            }

            let mut direction = self.direction(&eval.gradient, &history);
            let mut dir_deriv = dot(&eval.gradient, &direction);

            // Stale curvature can turn the quasi-Newton step uphill;
            // restart from steepest descent when it does
            if dir_deriv >= 0.0 {
                debug!("Non-descent direction at iteration {iteration}, resetting history");
                history.clear();
                direction = eval.gradient.iter().map(|g| -g).collect();
                dir_deriv = -grad_norm * grad_norm;
            }

            let initial_step = if history.is_empty() {
                (1.0 / grad_norm.max(1.0)).min(1.0)
            } else {
                1.0
            };

            let accepted =
                self.line_search(objective, &x, &eval, &direction, dir_deriv, initial_step)?;
            let (next_x, next_eval) = match accepted {
                Some(pair) => pair,
                None => {
                    warn!(
                        "Line search failed at iteration {iteration} (value {:.6}); \
                         returning current point",
                        eval.value
                    );
                    return Ok(x);
                }
            };

            let s: Vec<f64> = next_x.iter().zip(x.iter()).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = next_eval
                .gradient
                .iter()
                .zip(eval.gradient.iter())
                .map(|(a, b)| a - b)
                .collect();
            let ys = dot(&y, &s);
            // Curvature pairs with vanishing y.s would blow up rho
            if ys > 1e-10 {
                if history.len() == self.config.memory {
                    history.pop_front();
                }
                history.push_back((s, y, 1.0 / ys));
            }

            debug!(
                "Iteration {iteration}: value {:.6} -> {:.6}, |grad| {:.3e}",
                eval.value,
                next_eval.value,
                norm(&next_eval.gradient)
            );

            x = next_x;
            eval = next_eval;
        }

        warn!(
            "Reached max iterations ({}) with |grad| {:.3e}",
            self.config.max_iterations,
            norm(&eval.gradient)
        );
        Ok(x)
    }
}
