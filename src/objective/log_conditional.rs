//! Log-linear conditional likelihood objective

use crate::core::{ClassifyError, Evaluation, Objective, Result};
use crate::dataset::IndexedExamples;
use crate::objective::flat_index;
use crate::prior::Prior;
use crate::utils::math::log_sum_exp;

/// Negative regularized conditional log-likelihood of a multinomial
/// log-linear model.
///
/// Weights are flattened as `feature * num_classes + class`. Per example,
/// the per-class scores are the sums of that example's feature weights
/// (scaled by the feature value for real-valued data and by the example
/// weight when weighted); the normalizer is computed with `log_sum_exp`.
///
/// The observed-count half of the gradient does not depend on the weight
/// vector, so it is precomputed at construction and the data pass only
/// accumulates the model expectation.
pub struct LogConditionalObjective<'a, P: Prior> {
    examples: IndexedExamples<'a>,
    prior: P,
    derivative_numerator: Vec<f64>,
}

impl<'a, P: Prior> LogConditionalObjective<'a, P> {
    /// Create the objective over validated indexed examples
    pub fn new(examples: IndexedExamples<'a>, prior: P) -> Result<Self> {
        if examples.is_empty() {
            return Err(ClassifyError::EmptyDataset);
        }

        let dimension = examples.num_features * examples.num_classes;
        let mut numerator = vec![0.0; dimension];
        for d in 0..examples.len() {
            let weight = examples.weight(d);
            for (pos, &f) in examples.data[d].iter().enumerate() {
                let i = flat_index(f, examples.labels[d], examples.num_classes);
                numerator[i] -= weight * examples.value(d, pos);
            }
        }

        Ok(Self {
            examples,
            prior,
            derivative_numerator: numerator,
        })
    }

    /// Number of classes this objective is parameterized over
    pub fn num_classes(&self) -> usize {
        self.examples.num_classes
    }

    /// Number of features this objective is parameterized over
    pub fn num_features(&self) -> usize {
        self.examples.num_features
    }
}

impl<'a, P: Prior> Objective for LogConditionalObjective<'a, P> {
    fn domain_dimension(&self) -> usize {
        self.examples.num_features * self.examples.num_classes
    }

    fn calculate(&self, x: &[f64]) -> Result<Evaluation> {
        if x.len() != self.domain_dimension() {
            return Err(ClassifyError::DimensionMismatch {
                expected: self.domain_dimension(),
                actual: x.len(),
            });
        }

        let num_classes = self.examples.num_classes;
        let mut value = 0.0;
        let mut derivative = self.derivative_numerator.clone();
        let mut sums = vec![0.0; num_classes];

        for d in 0..self.examples.len() {
            let features = &self.examples.data[d];
            let example_weight = self.examples.weight(d);

            // activation
            sums.fill(0.0);
            for (pos, &f) in features.iter().enumerate() {
                let v = self.examples.value(d, pos);
                for (c, sum) in sums.iter_mut().enumerate() {
                    *sum += x[flat_index(f, c, num_classes)] * v;
                }
            }

            let total = log_sum_exp(&sums);

            // expectation
            for (c, &sum) in sums.iter().enumerate() {
                let prob = (sum - total).exp() * example_weight;
                for (pos, &f) in features.iter().enumerate() {
                    derivative[flat_index(f, c, num_classes)] +=
                        prob * self.examples.value(d, pos);
                }
            }

            value -= (sums[self.examples.labels[d]] - total) * example_weight;
        }

        value += self.prior.compute(x, &mut derivative);

        Ok(Evaluation { value, gradient: derivative })
    }
}
