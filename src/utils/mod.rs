//! Numeric utilities shared across objectives and classifiers

/// Log-domain and array math helpers
pub mod math {
    /// Numerically stable `ln(sum(exp(x_i)))`.
    ///
    /// Subtracts the maximum before exponentiating so inputs with
    /// magnitudes up to at least 1e6 neither overflow nor underflow.
    /// Returns negative infinity for an empty slice.
    pub fn log_sum_exp(xs: &[f64]) -> f64 {
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max.is_infinite() {
            return max;
        }
        let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
        max + sum.ln()
    }

    /// Index of the maximum element, ties resolved to the first encountered.
    ///
    /// Returns `None` for an empty slice.
    pub fn argmax(xs: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &x) in xs.iter().enumerate() {
            match best {
                Some((_, b)) if x <= b => {}
                _ => best = Some((i, x)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Flatten a rectangular `rows x cols` matrix into a single vector,
    /// row-major (`index = row * cols + col`)
    pub fn to_1d(matrix: &[Vec<f64>]) -> Vec<f64> {
        matrix.iter().flat_map(|row| row.iter().copied()).collect()
    }

    /// Unflatten a row-major vector back into a `rows x cols` matrix
    ///
    /// # Panics
    /// Panics if `flat.len() != rows * cols`.
    pub fn to_2d(flat: &[f64], rows: usize, cols: usize) -> Vec<Vec<f64>> {
        assert_eq!(
            flat.len(),
            rows * cols,
            "Flat vector length must equal rows * cols"
        );
        (0..rows)
            .map(|r| flat[r * cols..(r + 1) * cols].to_vec())
            .collect()
    }

    /// Dot product of two dense slices of equal length
    pub fn dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    /// Euclidean norm of a dense slice
    pub fn norm(xs: &[f64]) -> f64 {
        xs.iter().map(|&x| x * x).sum::<f64>().sqrt()
    }
}

/// Gradient verification helpers
pub mod gradient {
    use crate::core::{Objective, Result};

    /// Central finite-difference approximation of an objective's gradient.
    ///
    /// Used by tests to cross-check analytic gradients; step `h` trades
    /// truncation against round-off (1e-5 works for well-scaled problems).
    pub fn finite_difference(obj: &dyn Objective, x: &[f64], h: f64) -> Result<Vec<f64>> {
        let mut grad = vec![0.0; x.len()];
        let mut probe = x.to_vec();
        for i in 0..x.len() {
            probe[i] = x[i] + h;
            let plus = obj.value_at(&probe)?;
            probe[i] = x[i] - h;
            let minus = obj.value_at(&probe)?;
            probe[i] = x[i];
            grad[i] = (plus - minus) / (2.0 * h);
        }
        Ok(grad)
    }
}
