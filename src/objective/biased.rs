//! Confusion-matrix-biased conditional likelihood objective

use crate::core::{ClassifyError, Evaluation, Objective, Result};
use crate::dataset::IndexedExamples;
use crate::objective::flat_index;
use crate::prior::Prior;
use crate::utils::math::log_sum_exp;

/// Log-linear objective whose target posterior is reweighted by a
/// confusion matrix over the observed labels.
///
/// Per example with observed label `y`, the loss is
/// `-ln(sum_c confusion[y][c] * exp(sums[c] - total))` and the gradient
/// moves the plain posterior toward the confusion-weighted one. Used for
/// training against noisy or systematically biased annotations.
///
/// Confusion entries must be strictly positive: their logarithm enters
/// the per-class scores directly, so a zero or negative entry is rejected
/// at construction rather than surfacing as a NaN mid-optimization.
pub struct BiasedLogConditionalObjective<'a, P: Prior> {
    examples: IndexedExamples<'a>,
    prior: P,
    log_confusion: Vec<Vec<f64>>,
}

impl<'a, P: Prior> BiasedLogConditionalObjective<'a, P> {
    /// Create the objective over categorical indexed examples.
    ///
    /// `confusion[observed][c]` weights class `c` in the posterior for
    /// examples observed as `observed`; it must be `num_classes` square
    /// with entries > 0.
    pub fn new(
        examples: IndexedExamples<'a>,
        confusion: &[Vec<f64>],
        prior: P,
    ) -> Result<Self> {
        if examples.is_empty() {
            return Err(ClassifyError::EmptyDataset);
        }
        if examples.values.is_some() {
            return Err(ClassifyError::NotSupported(
                "Biased objective is defined over categorical data only".to_string(),
            ));
        }
        if confusion.len() != examples.num_classes {
            return Err(ClassifyError::DimensionMismatch {
                expected: examples.num_classes,
                actual: confusion.len(),
            });
        }

        let mut log_confusion = Vec::with_capacity(confusion.len());
        for row in confusion {
            if row.len() != examples.num_classes {
                return Err(ClassifyError::DimensionMismatch {
                    expected: examples.num_classes,
                    actual: row.len(),
                });
            }
            if let Some(&entry) = row.iter().find(|e| **e <= 0.0) {
                return Err(ClassifyError::NumericError(format!(
                    "Confusion matrix entries must be positive, got {entry}"
                )));
            }
            log_confusion.push(row.iter().map(|e| e.ln()).collect());
        }

        Ok(Self {
            examples,
            prior,
            log_confusion,
        })
    }
}

impl<'a, P: Prior> Objective for BiasedLogConditionalObjective<'a, P> {
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
        let mut derivative = vec![0.0; x.len()];
        let mut sums = vec![0.0; num_classes];
        let mut weighted_sums = vec![0.0; num_classes];

        for d in 0..self.examples.len() {
            let features = &self.examples.data[d];
            let observed = self.examples.labels[d];

            // activation
            sums.fill(0.0);
            for &f in features {
                for (c, sum) in sums.iter_mut().enumerate() {
                    *sum += x[flat_index(f, c, num_classes)];
                }
            }
            for c in 0..num_classes {
                weighted_sums[c] = self.log_confusion[observed][c] + sums[c];
            }

            let total = log_sum_exp(&sums);
            let weighted_total = log_sum_exp(&weighted_sums);

            // gradient pulls the plain posterior toward the weighted one
            for c in 0..num_classes {
                let prob = (sums[c] - total).exp();
                let weighted_prob = (weighted_sums[c] - weighted_total).exp();
                for &f in features {
                    derivative[flat_index(f, c, num_classes)] += prob - weighted_prob;
                }
            }

            value -= weighted_total - total;
        }

        value += self.prior.compute(x, &mut derivative);

        Ok(Evaluation { value, gradient: derivative })
    }
}
