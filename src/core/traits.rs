//! Core traits for objectives, minimizers, and classifiers

use crate::core::{Datum, Result};

/// A value/gradient pair produced by one objective evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Scalar objective value
    pub value: f64,
    /// Gradient, same length as the weight vector
    pub gradient: Vec<f64>,
}

/// Differentiable objective function over a flattened weight vector.
///
/// Implementations compute the value and gradient together in `calculate`,
/// since both walk the same data pass. The minimizer consumes this contract
/// and nothing else.
pub trait Objective {
    /// Length of the weight vector this objective is defined over
    fn domain_dimension(&self) -> usize;

    /// Compute value and gradient at `x`
    ///
    /// Returns `DimensionMismatch` if `x` has the wrong length.
    fn calculate(&self, x: &[f64]) -> Result<Evaluation>;

    /// Objective value at `x`
    fn value_at(&self, x: &[f64]) -> Result<f64> {
        Ok(self.calculate(x)?.value)
    }

    /// Gradient at `x`
    fn derivative_at(&self, x: &[f64]) -> Result<Vec<f64>> {
        Ok(self.calculate(x)?.gradient)
    }
}

/// Iterative numerical minimizer consuming the `Objective` contract
pub trait Minimizer {
    /// Minimize `objective` starting from `initial`, stopping when the
    /// gradient norm falls below `tolerance` (scaled) or iterations run out
    fn minimize(
        &self,
        objective: &dyn Objective,
        tolerance: f64,
        initial: &[f64],
    ) -> Result<Vec<f64>>;
}

/// Trained classifier answering argmax queries over symbolic examples
pub trait Classifier<F, L: Clone> {
    /// Per-class raw scores, aligned with the label index
    fn scores_of(&self, datum: &Datum<F, L>) -> Vec<f64>;

    /// Most likely label; ties go to the first label in index order
    fn class_of(&self, datum: &Datum<F, L>) -> L;
}

/// Classifier that also answers calibrated probability queries
pub trait ProbabilisticClassifier<F, L: Clone>: Classifier<F, L> {
    /// Per-class posterior probabilities, aligned with the label index;
    /// sums to 1.0 within floating tolerance
    fn probability_of(&self, datum: &Datum<F, L>) -> Vec<f64>;

    /// Per-class log posteriors, aligned with the label index
    fn log_probability_of(&self, datum: &Datum<F, L>) -> Vec<f64>;
}
