//! Convex combination of two objectives

use crate::core::{ClassifyError, Evaluation, Objective, Result};

/// Semi-supervised objective: `alpha * supervised + (1 - alpha) * biased`.
///
/// The supervised term is typically a plain conditional-likelihood
/// objective over labeled data and the biased term a confusion-weighted
/// objective over automatically labeled data. Both are held as trait
/// objects and combined by delegation; gradients mix with the same
/// coefficients as the values.
pub struct SemiSupervisedObjective<'a> {
    supervised: Box<dyn Objective + 'a>,
    biased: Box<dyn Objective + 'a>,
    alpha: f64,
}

impl<'a> SemiSupervisedObjective<'a> {
    /// Combine two objectives with supervised fraction `alpha` in [0, 1].
    ///
    /// The two objectives must share a domain dimension.
    pub fn new(
        supervised: Box<dyn Objective + 'a>,
        biased: Box<dyn Objective + 'a>,
        alpha: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ClassifyError::InvalidParameter(format!(
                "Convex combination fraction must be in [0, 1], got {alpha}"
            )));
        }
        if supervised.domain_dimension() != biased.domain_dimension() {
            return Err(ClassifyError::DimensionMismatch {
                expected: supervised.domain_dimension(),
                actual: biased.domain_dimension(),
            });
        }
        Ok(Self {
            supervised,
            biased,
            alpha,
        })
    }
}

impl<'a> Objective for SemiSupervisedObjective<'a> {
    fn domain_dimension(&self) -> usize {
        self.supervised.domain_dimension()
    }

    fn calculate(&self, x: &[f64]) -> Result<Evaluation> {
        let sup = self.supervised.calculate(x)?;
        let bias = self.biased.calculate(x)?;

        let value = self.alpha * sup.value + (1.0 - self.alpha) * bias.value;
        let gradient = sup
            .gradient
            .iter()
            .zip(bias.gradient.iter())
            .map(|(s, b)| self.alpha * s + (1.0 - self.alpha) * b)
            .collect();

        Ok(Evaluation { value, gradient })
    }
}
