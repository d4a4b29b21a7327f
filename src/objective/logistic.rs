//! Multinomial logistic objectives with a fixed reference class

use crate::core::{ClassifyError, Evaluation, Objective, Result};
use crate::dataset::IndexedExamples;
use crate::prior::Prior;
use crate::utils::math::log_sum_exp;

/// Multinomial logistic regression objective.
///
/// Class 0 is the reference: its score is fixed at 0 and carries no
/// weights, removing the softmax's redundant degree of freedom. Weights
/// are laid out class-major, `(class - 1) * num_features + feature`, for
/// a domain of `(num_classes - 1) * num_features`.
pub struct MultinomialLogisticObjective<'a, P: Prior> {
    examples: IndexedExamples<'a>,
    prior: P,
}

impl<'a, P: Prior> MultinomialLogisticObjective<'a, P> {
    /// Create the objective over validated indexed examples
    pub fn new(examples: IndexedExamples<'a>, prior: P) -> Result<Self> {
        if examples.is_empty() {
            return Err(ClassifyError::EmptyDataset);
        }
        if examples.num_classes < 2 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Multinomial logistic needs at least 2 classes, got {}",
                examples.num_classes
            )));
        }
        Ok(Self { examples, prior })
    }

    fn block(&self, class: usize) -> usize {
        (class - 1) * self.examples.num_features
    }
}

impl<'a, P: Prior> Objective for MultinomialLogisticObjective<'a, P> {
    fn domain_dimension(&self) -> usize {
        (self.examples.num_classes - 1) * self.examples.num_features
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
        let mut derivative = vec![0.0; x.len()];
        let mut sums = vec![0.0; num_classes];

        for d in 0..self.examples.len() {
            let features = &self.examples.data[d];
            let observed = self.examples.labels[d];
            let example_weight = self.examples.weight(d);

            // log-odds against the reference class
            sums.fill(0.0);
            for c in 1..num_classes {
                let block = self.block(c);
                for (pos, &f) in features.iter().enumerate() {
                    sums[c] += x[block + f] * self.examples.value(d, pos);
                }
            }

            let total = log_sum_exp(&sums);

            for c in 1..num_classes {
                let residual = (sums[c] - total).exp() - if c == observed { 1.0 } else { 0.0 };
                let block = self.block(c);
                for (pos, &f) in features.iter().enumerate() {
                    derivative[block + f] +=
                        example_weight * residual * self.examples.value(d, pos);
                }
            }

            value -= (sums[observed] - total) * example_weight;
        }

        value += self.prior.compute(x, &mut derivative);

        Ok(Evaluation { value, gradient: derivative })
    }
}

/// Robust multinomial logistic objective with per-example shift params.
///
/// Each example gets one slack weight per non-reference class, acting as
/// a soft per-example bias that can absorb outlier loss. The domain is
/// `(num_classes - 1) * (num_features + num_examples)`, class-major, each
/// class block holding the feature weights followed by the per-example
/// slacks. The prior only touches the feature sub-blocks; the slack
/// indices are exempt and enumerable via `unregularized_indices`.
pub struct ShiftParamsLogisticObjective<'a, P: Prior> {
    examples: IndexedExamples<'a>,
    prior: P,
}

impl<'a, P: Prior> ShiftParamsLogisticObjective<'a, P> {
    /// Create the objective over validated indexed examples
    pub fn new(examples: IndexedExamples<'a>, prior: P) -> Result<Self> {
        if examples.is_empty() {
            return Err(ClassifyError::EmptyDataset);
        }
        if examples.num_classes < 2 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Multinomial logistic needs at least 2 classes, got {}",
                examples.num_classes
            )));
        }
        Ok(Self { examples, prior })
    }

    /// Width of one class block: feature weights plus one slack per example
    fn block_width(&self) -> usize {
        self.examples.num_features + self.examples.len()
    }

    fn block(&self, class: usize) -> usize {
        (class - 1) * self.block_width()
    }

    /// Flattened indices exempt from regularization (the slack weights)
    pub fn unregularized_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for c in 1..self.examples.num_classes {
            let slack_start = self.block(c) + self.examples.num_features;
            indices.extend(slack_start..slack_start + self.examples.len());
        }
        indices
    }

    /// Extract the feature-weight sub-blocks from a full weight vector,
    /// dropping the slacks: `(num_classes - 1) * num_features` flattened
    /// class-major, suitable for inference on unseen examples
    pub fn feature_weights(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.domain_dimension() {
            return Err(ClassifyError::DimensionMismatch {
                expected: self.domain_dimension(),
                actual: x.len(),
            });
        }
        let mut weights = Vec::with_capacity(
            (self.examples.num_classes - 1) * self.examples.num_features,
        );
        for c in 1..self.examples.num_classes {
            let block = self.block(c);
            weights.extend_from_slice(&x[block..block + self.examples.num_features]);
        }
        Ok(weights)
    }
}

impl<'a, P: Prior> Objective for ShiftParamsLogisticObjective<'a, P> {
    fn domain_dimension(&self) -> usize {
        (self.examples.num_classes - 1) * self.block_width()
    }

    fn calculate(&self, x: &[f64]) -> Result<Evaluation> {
        if x.len() != self.domain_dimension() {
            return Err(ClassifyError::DimensionMismatch {
                expected: self.domain_dimension(),
                actual: x.len(),
            });
        }

        let num_classes = self.examples.num_classes;
        let num_features = self.examples.num_features;
        let mut value = 0.0;
        let mut derivative = vec![0.0; x.len()];
        let mut sums = vec![0.0; num_classes];

        for d in 0..self.examples.len() {
            let features = &self.examples.data[d];
            let observed = self.examples.labels[d];
            let example_weight = self.examples.weight(d);

            // log-odds: feature weights plus this example's slack
            sums.fill(0.0);
            for c in 1..num_classes {
                let block = self.block(c);
                for (pos, &f) in features.iter().enumerate() {
                    sums[c] += x[block + f] * self.examples.value(d, pos);
                }
                sums[c] += x[block + num_features + d];
            }

            let total = log_sum_exp(&sums);

            for c in 1..num_classes {
                let residual = (sums[c] - total).exp() - if c == observed { 1.0 } else { 0.0 };
                let block = self.block(c);
                for (pos, &f) in features.iter().enumerate() {
                    derivative[block + f] +=
                        example_weight * residual * self.examples.value(d, pos);
                }
                derivative[block + num_features + d] += example_weight * residual;
            }

            value -= (sums[observed] - total) * example_weight;
        }

        // Regularize the feature sub-blocks only; slacks stay free
        for c in 1..num_classes {
            let block = self.block(c);
            let (xs, grads) = (
                &x[block..block + num_features],
                &mut derivative[block..block + num_features],
            );
            value += self.prior.compute(xs, grads);
        }

        Ok(Evaluation { value, gradient: derivative })
    }
}
