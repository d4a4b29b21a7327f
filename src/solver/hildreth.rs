//! Hildreth's algorithm for box-constrained quadratic programs
//!
//! Solves the dual of MIRA's margin-constrained update: given constraint
//! vectors `a_i` and targets `b_i`, find `alpha_i >= 0` maximizing the
//! dual objective by coordinate ascent, repeatedly picking the most
//! violated KKT condition and projecting that coordinate.

use crate::core::{ClassifyError, Result, SparseVector};

/// Configuration for Hildreth's coordinate ascent
#[derive(Debug, Clone)]
pub struct HildrethConfig {
    /// Iteration cap; the best alphas found so far are returned on hitting it
    pub max_iterations: usize,
    /// KKT violation threshold treated as converged
    pub epsilon: f64,
    /// Magnitude below which a diagonal entry counts as zero
    pub zero: f64,
}

impl Default for HildrethConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            epsilon: 1e-8,
            zero: 1e-12,
        }
    }
}

/// Solve for the dual variables of a small constrained QP.
///
/// `constraints[i]` is the i-th constraint's feature vector and `b[i]`
/// its target (for MIRA, `loss_i - margin_i`). Returns one non-negative
/// alpha per constraint. Non-convergence is not an error: the iteration
/// cap bounds the work and the current alphas are returned.
pub fn hildreth(
    constraints: &[SparseVector],
    b: &[f64],
    config: &HildrethConfig,
) -> Result<Vec<f64>> {
    if constraints.len() != b.len() {
        return Err(ClassifyError::DimensionMismatch {
            expected: constraints.len(),
            actual: b.len(),
        });
    }
    let k = constraints.len();
    if k == 0 {
        return Ok(Vec::new());
    }

    // Gram matrix of the constraint vectors; k is a mini-batch size, so
    // the full matrix stays small
    let mut gram = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in i..k {
            let dot = constraints[i].dot(&constraints[j]);
            gram[i][j] = dot;
            gram[j][i] = dot;
        }
    }

    let mut alpha = vec![0.0; k];
    let mut f: Vec<f64> = b.to_vec();
    let mut kkt = f.clone();

    let (mut max_kkt, mut max_kkt_i) = max_with_index(&kkt);

    let mut iterations = 0;
    while max_kkt >= config.epsilon && iterations < config.max_iterations {
        let i = max_kkt_i;
        let diff_alpha = if gram[i][i] <= config.zero {
            0.0
        } else {
            f[i] / gram[i][i]
        };

        // Project back onto alpha >= 0
        let add_alpha = if alpha[i] + diff_alpha < 0.0 {
            -alpha[i]
        } else {
            diff_alpha
        };
        alpha[i] += add_alpha;

        for j in 0..k {
            f[j] -= add_alpha * gram[j][i];
            // At an active constraint any residual is a violation; at an
            // inactive one only a positive residual is
            kkt[j] = if alpha[j] > config.zero { f[j].abs() } else { f[j] };
        }

        (max_kkt, max_kkt_i) = max_with_index(&kkt);
        iterations += 1;
    }

    if iterations >= config.max_iterations {
        log::warn!(
            "Hildreth hit iteration cap ({}) with max KKT violation {:.3e}",
            config.max_iterations,
            max_kkt
        );
    }

    Ok(alpha)
}

fn max_with_index(xs: &[f64]) -> (f64, usize) {
    let mut best = f64::NEG_INFINITY;
    let mut best_i = 0;
    for (i, &x) in xs.iter().enumerate() {
        if x > best {
            best = x;
            best_i = i;
        }
    }
    (best, best_i)
}
