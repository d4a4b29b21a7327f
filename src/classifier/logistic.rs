//! Multinomial logistic classifier (reference-class parameterization)

use crate::core::{
    ClassifyError, Classifier, Datum, Index, ProbabilisticClassifier, Result,
};
use crate::utils::math::{argmax, log_sum_exp};
use std::hash::Hash;

/// Trained multinomial logistic classifier.
///
/// The first label in the index is the reference class: its log-odds are
/// fixed at zero and it carries no weights. The remaining classes each
/// hold one weight per feature, flattened class-major as
/// `(class - 1) * num_features + feature`, the layout the logistic
/// objectives train. Unseen features contribute zero score, as in
/// `LinearClassifier`.
#[derive(Debug, Clone)]
pub struct MultinomialLogisticClassifier<F: Eq + Hash + Clone, L: Eq + Hash + Clone> {
    weights: Vec<f64>,
    feature_index: Index<F>,
    label_index: Index<L>,
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> MultinomialLogisticClassifier<F, L> {
    /// Create a classifier from reference-class weights and the training
    /// indices; both indices are locked
    pub fn new(
        weights: Vec<f64>,
        mut feature_index: Index<F>,
        mut label_index: Index<L>,
    ) -> Result<Self> {
        if label_index.len() < 2 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Multinomial logistic needs at least 2 classes, got {}",
                label_index.len()
            )));
        }
        let expected = (label_index.len() - 1) * feature_index.len();
        if weights.len() != expected {
            return Err(ClassifyError::DimensionMismatch {
                expected,
                actual: weights.len(),
            });
        }
        feature_index.lock();
        label_index.lock();
        Ok(Self {
            weights,
            feature_index,
            label_index,
        })
    }

    /// Number of features in the trained model
    pub fn num_features(&self) -> usize {
        self.feature_index.len()
    }

    /// Number of classes including the reference
    pub fn num_classes(&self) -> usize {
        self.label_index.len()
    }

    /// The frozen feature index
    pub fn feature_index(&self) -> &Index<F> {
        &self.feature_index
    }

    /// The frozen label index
    pub fn label_index(&self) -> &Index<L> {
        &self.label_index
    }

    /// The flat weight vector (`(num_classes - 1) * num_features`)
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn scores_internal(&self, datum: &Datum<F, L>) -> Vec<f64> {
        let num_features = self.num_features();
        // Reference class score pinned at zero
        let mut scores = vec![0.0; self.num_classes()];
        for (pos, feature) in datum.features.iter().enumerate() {
            let Some(f) = self.feature_index.index_of(feature) else {
                continue;
            };
            let v = datum.values.as_ref().map_or(1.0, |vals| vals[pos]);
            for c in 1..self.num_classes() {
                scores[c] += self.weights[(c - 1) * num_features + f] * v;
            }
        }
        scores
    }
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> Classifier<F, L>
    for MultinomialLogisticClassifier<F, L>
{
    fn scores_of(&self, datum: &Datum<F, L>) -> Vec<f64> {
        self.scores_internal(datum)
    }

    fn class_of(&self, datum: &Datum<F, L>) -> L {
        let scores = self.scores_internal(datum);
        let best = argmax(&scores).expect("classifier has at least two labels");
        self.label_index.get(best).unwrap().clone()
    }
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> ProbabilisticClassifier<F, L>
    for MultinomialLogisticClassifier<F, L>
{
    fn probability_of(&self, datum: &Datum<F, L>) -> Vec<f64> {
        self.log_probability_of(datum)
            .into_iter()
            .map(f64::exp)
            .collect()
    }

    fn log_probability_of(&self, datum: &Datum<F, L>) -> Vec<f64> {
        let scores = self.scores_internal(datum);
        let total = log_sum_exp(&scores);
        scores.into_iter().map(|s| s - total).collect()
    }
}
