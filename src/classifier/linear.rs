//! Linear (log-linear) classifier inference

use crate::core::{
    ClassifyError, Classifier, Datum, Index, ProbabilisticClassifier, Result,
};
use crate::objective::flat_index;
use crate::utils::math::{argmax, log_sum_exp, to_2d};
use std::hash::Hash;

/// Trained multiclass log-linear classifier.
///
/// Wraps the learned flat weights plus the frozen feature and label
/// indices. Weights are laid out `feature * num_classes + class`.
/// Features absent from the training index contribute zero score: unseen
/// vocabulary at classification time is expected, not an error.
#[derive(Debug, Clone)]
pub struct LinearClassifier<F: Eq + Hash + Clone, L: Eq + Hash + Clone> {
    weights: Vec<f64>,
    feature_index: Index<F>,
    label_index: Index<L>,
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> LinearClassifier<F, L> {
    /// Create a classifier from flat weights and the training indices.
    ///
    /// The indices are locked: the model's feature and label spaces are
    /// frozen from here on.
    pub fn new(
        weights: Vec<f64>,
        mut feature_index: Index<F>,
        mut label_index: Index<L>,
    ) -> Result<Self> {
        if label_index.is_empty() {
            return Err(ClassifyError::InvalidParameter(
                "Classifier needs at least one label".to_string(),
            ));
        }
        let expected = feature_index.len() * label_index.len();
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

    /// Number of classes in the trained model
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

    /// The flat weight vector
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The weights as a `num_features x num_classes` matrix
    pub fn weight_matrix(&self) -> Vec<Vec<f64>> {
        to_2d(&self.weights, self.num_features(), self.num_classes())
    }

    /// Weight of one (feature, label) pair; 0.0 for unknown features
    pub fn weight(&self, feature: &F, label: &L) -> f64 {
        match (
            self.feature_index.index_of(feature),
            self.label_index.index_of(label),
        ) {
            (Some(f), Some(c)) => self.weights[flat_index(f, c, self.num_classes())],
            _ => 0.0,
        }
    }

    /// The `n` largest-magnitude `(feature, label, weight)` triples
    pub fn top_features(&self, n: usize) -> Vec<(F, L, f64)> {
        let num_classes = self.num_classes();
        let mut triples: Vec<(F, L, f64)> = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let feature = self.feature_index.get(i / num_classes).unwrap().clone();
                let label = self.label_index.get(i % num_classes).unwrap().clone();
                (feature, label, w)
            })
            .collect();
        triples.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        triples.truncate(n);
        triples
    }

    fn scores_internal(&self, datum: &Datum<F, L>) -> Vec<f64> {
        let num_classes = self.num_classes();
        let mut scores = vec![0.0; num_classes];
        for (pos, feature) in datum.features.iter().enumerate() {
            // Open vocabulary: unseen features contribute nothing
            let Some(f) = self.feature_index.index_of(feature) else {
                continue;
            };
            let v = datum.values.as_ref().map_or(1.0, |vals| vals[pos]);
            for (c, score) in scores.iter_mut().enumerate() {
                *score += self.weights[flat_index(f, c, num_classes)] * v;
            }
        }
        scores
    }
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> Classifier<F, L> for LinearClassifier<F, L> {
    fn scores_of(&self, datum: &Datum<F, L>) -> Vec<f64> {
        self.scores_internal(datum)
    }

    fn class_of(&self, datum: &Datum<F, L>) -> L {
        let scores = self.scores_internal(datum);
        let best = argmax(&scores).expect("classifier has at least one label");
        self.label_index.get(best).unwrap().clone()
    }
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> ProbabilisticClassifier<F, L>
    for LinearClassifier<F, L>
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn toy_classifier() -> LinearClassifier<&'static str, &'static str> {
        let feature_index: Index<&str> = ["a", "b", "c"].into_iter().collect();
        let label_index: Index<&str> = ["neg", "pos"].into_iter().collect();
        // Layout: [a:neg, a:pos, b:neg, b:pos, c:neg, c:pos]
        let weights = vec![-1.0, 1.0, 0.0, 0.5, 2.0, -2.0];
        LinearClassifier::new(weights, feature_index, label_index).unwrap()
    }

    #[test]
    fn test_scores_sum_feature_weights() {
        let classifier = toy_classifier();
        let datum = Datum::new(vec!["a", "b"], "pos");

        let scores = classifier.scores_of(&datum);
        assert_relative_eq!(scores[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(scores[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_class_of_argmax() {
        let classifier = toy_classifier();
        assert_eq!(classifier.class_of(&Datum::new(vec!["a"], "")), "pos");
        assert_eq!(classifier.class_of(&Datum::new(vec!["c"], "")), "neg");
    }

    #[test]
    fn test_class_of_tie_breaks_to_first_label() {
        let classifier = toy_classifier();
        // Feature "b" scores [0.0, 0.5]; no features at all ties at zero
        let datum = Datum::new(vec![], "");
        assert_eq!(classifier.class_of(&datum), "neg");
    }

    #[test]
    fn test_unseen_features_are_ignored() {
        let classifier = toy_classifier();
        let with_unseen = Datum::new(vec!["a", "never-seen"], "");
        let without = Datum::new(vec!["a"], "");

        assert_eq!(
            classifier.scores_of(&with_unseen),
            classifier.scores_of(&without)
        );
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let classifier = toy_classifier();
        let datum = Datum::new(vec!["a", "b", "c"], "");

        let probs = classifier.probability_of(&datum);
        let sum: f64 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
        for p in probs {
            assert!(p > 0.0 && p < 1.0);
        }
    }

    #[test]
    fn test_log_probabilities_match_probabilities() {
        let classifier = toy_classifier();
        let datum = Datum::new(vec!["b", "c"], "");

        let probs = classifier.probability_of(&datum);
        let log_probs = classifier.log_probability_of(&datum);
        for (p, lp) in probs.iter().zip(log_probs.iter()) {
            assert_relative_eq!(p.ln(), lp, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_real_valued_datum_scales_scores() {
        let classifier = toy_classifier();
        let datum = Datum::with_values(vec!["a"], vec![2.0], "");

        let scores = classifier.scores_of(&datum);
        assert_relative_eq!(scores[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(scores[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_lookup() {
        let classifier = toy_classifier();
        assert_eq!(classifier.weight(&"c", &"neg"), 2.0);
        assert_eq!(classifier.weight(&"unknown", &"neg"), 0.0);
    }

    #[test]
    fn test_top_features() {
        let classifier = toy_classifier();
        let top = classifier.top_features(2);

        assert_eq!(top.len(), 2);
        // The two magnitude-2.0 weights on feature "c" come first
        assert_eq!(top[0].0, "c");
        assert_eq!(top[1].0, "c");
    }

    #[test]
    fn test_indices_locked_after_training() {
        let classifier = toy_classifier();
        assert!(classifier.feature_index().is_locked());
        assert!(classifier.label_index().is_locked());
    }

    #[test]
    fn test_rejects_mismatched_weights() {
        let feature_index: Index<&str> = ["a"].into_iter().collect();
        let label_index: Index<&str> = ["x", "y"].into_iter().collect();
        let result = LinearClassifier::new(vec![0.0; 3], feature_index, label_index);
        assert!(matches!(
            result,
            Err(ClassifyError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_weight_matrix_round_trip() {
        let classifier = toy_classifier();
        let matrix = classifier.weight_matrix();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[2], vec![2.0, -2.0]);
    }
}
