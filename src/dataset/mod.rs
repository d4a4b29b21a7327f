//! Dataset construction and feature/label indexing
//!
//! A `Dataset` turns symbolic labeled examples into the dense integer form
//! the objectives consume: feature-id arrays per example, label ids, and
//! optional per-feature values and per-example weights.

pub mod svmlight;

use crate::core::{ClassifyError, Datum, Index, Result};
use log::info;
use std::hash::Hash;

/// Indexed training set over symbolic features and labels.
///
/// Examples are either all categorical (every feature counts 1.0) or all
/// real-valued; mixing the two is an error. The feature and label indices
/// grow as examples are added and are handed to the trained classifier,
/// which locks them.
#[derive(Debug, Clone)]
pub struct Dataset<F: Eq + Hash + Clone, L: Eq + Hash + Clone> {
    feature_index: Index<F>,
    label_index: Index<L>,
    data: Vec<Vec<usize>>,
    values: Option<Vec<Vec<f64>>>,
    labels: Vec<usize>,
    weights: Option<Vec<f32>>,
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> Dataset<F, L> {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self {
            feature_index: Index::new(),
            label_index: Index::new(),
            data: Vec::new(),
            values: None,
            labels: Vec::new(),
            weights: None,
        }
    }

    /// Add an example with implicit weight 1.0
    pub fn add(&mut self, datum: &Datum<F, L>) -> Result<()> {
        self.add_internal(datum, None)
    }

    /// Add an example with an explicit non-negative weight
    pub fn add_weighted(&mut self, datum: &Datum<F, L>, weight: f32) -> Result<()> {
        if weight < 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Example weight must be non-negative, got {weight}"
            )));
        }
        self.add_internal(datum, Some(weight))
    }

    fn add_internal(&mut self, datum: &Datum<F, L>, weight: Option<f32>) -> Result<()> {
        // Categorical and real-valued examples cannot be mixed: the
        // objective picks its code path from the whole dataset at once
        let rvf = datum.values.is_some();
        if !self.data.is_empty() && rvf != self.values.is_some() {
            return Err(ClassifyError::NotSupported(
                "Cannot mix categorical and real-valued examples in one dataset".to_string(),
            ));
        }

        let label_id = self
            .label_index
            .add(datum.label.clone())
            .ok_or_else(|| ClassifyError::InvalidParameter("Label index is locked".to_string()))?;

        let mut ids = Vec::with_capacity(datum.features.len());
        for f in &datum.features {
            let id = self.feature_index.add(f.clone()).ok_or_else(|| {
                ClassifyError::InvalidParameter("Feature index is locked".to_string())
            })?;
            ids.push(id);
        }

        if rvf {
            let vals = datum.values.clone().unwrap();
            self.values.get_or_insert_with(Vec::new).push(vals);
        }
        self.data.push(ids);
        self.labels.push(label_id);

        match (&mut self.weights, weight) {
            (Some(ws), w) => ws.push(w.unwrap_or(1.0)),
            (None, Some(w)) => {
                // First weighted example: earlier examples were implicitly 1.0
                let mut ws = vec![1.0; self.data.len() - 1];
                ws.push(w);
                self.weights = Some(ws);
            }
            (None, None) => {}
        }

        Ok(())
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of distinct features seen so far
    pub fn num_features(&self) -> usize {
        self.feature_index.len()
    }

    /// Number of distinct labels seen so far
    pub fn num_classes(&self) -> usize {
        self.label_index.len()
    }

    /// The feature index
    pub fn feature_index(&self) -> &Index<F> {
        &self.feature_index
    }

    /// The label index
    pub fn label_index(&self) -> &Index<L> {
        &self.label_index
    }

    /// Consume the dataset, returning its feature and label indices
    pub fn into_indices(self) -> (Index<F>, Index<L>) {
        (self.feature_index, self.label_index)
    }

    /// Borrow the dense integer form consumed by objectives
    pub fn indexed(&self) -> Result<IndexedExamples<'_>> {
        IndexedExamples::new(
            self.num_features(),
            self.num_classes(),
            &self.data,
            self.values.as_deref(),
            &self.labels,
            self.weights.as_deref(),
        )
    }

    /// Drop features occurring in fewer than `threshold` examples and
    /// re-index the survivors, preserving their relative order.
    ///
    /// Feature ids change; any weights trained against the old index are
    /// invalidated. Count-valued duplicates within one example count once.
    pub fn apply_feature_count_threshold(&mut self, threshold: usize) {
        let mut counts = vec![0usize; self.num_features()];
        for features in &self.data {
            let mut seen = vec![false; self.num_features()];
            for &f in features {
                if !seen[f] {
                    seen[f] = true;
                    counts[f] += 1;
                }
            }
        }

        let mut new_index = Index::new();
        let mut remap: Vec<Option<usize>> = vec![None; self.num_features()];
        for (old_id, count) in counts.iter().enumerate() {
            if *count >= threshold {
                let item = self.feature_index.get(old_id).unwrap().clone();
                remap[old_id] = new_index.add(item);
            }
        }

        for (d, features) in self.data.iter_mut().enumerate() {
            let mut kept_ids = Vec::with_capacity(features.len());
            let mut kept_values = Vec::new();
            for (pos, &f) in features.iter().enumerate() {
                if let Some(new_id) = remap[f] {
                    kept_ids.push(new_id);
                    if let Some(values) = &self.values {
                        kept_values.push(values[d][pos]);
                    }
                }
            }
            *features = kept_ids;
            if let Some(values) = &mut self.values {
                values[d] = kept_values;
            }
        }

        self.feature_index = new_index;
    }

    /// Log a short summary of the dataset's shape
    pub fn summary_statistics(&self) {
        info!(
            "Dataset: {} examples, {} features, {} classes{}",
            self.len(),
            self.num_features(),
            self.num_classes(),
            if self.values.is_some() {
                " (real-valued)"
            } else {
                ""
            }
        );
    }
}

impl<F: Eq + Hash + Clone, L: Eq + Hash + Clone> Default for Dataset<F, L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed dense view of an indexed training set.
///
/// This is the boundary the objectives consume: validated on construction
/// so the inner loops can index without checks.
#[derive(Debug, Clone, Copy)]
pub struct IndexedExamples<'a> {
    /// Number of distinct features (weight rows)
    pub num_features: usize,
    /// Number of classes (weight columns)
    pub num_classes: usize,
    /// Feature ids per example
    pub data: &'a [Vec<usize>],
    /// Per-feature real values parallel to `data`, if real-valued
    pub values: Option<&'a [Vec<f64>]>,
    /// Observed label id per example
    pub labels: &'a [usize],
    /// Per-example weights, if weighted
    pub weights: Option<&'a [f32]>,
}

impl<'a> IndexedExamples<'a> {
    /// Validate and wrap raw indexed arrays.
    ///
    /// Checks array lengths agree, label ids are in `[0, num_classes)`,
    /// feature ids are in `[0, num_features)`, and weights are
    /// non-negative.
    pub fn new(
        num_features: usize,
        num_classes: usize,
        data: &'a [Vec<usize>],
        values: Option<&'a [Vec<f64>]>,
        labels: &'a [usize],
        weights: Option<&'a [f32]>,
    ) -> Result<Self> {
        if labels.len() != data.len() {
            return Err(ClassifyError::DimensionMismatch {
                expected: data.len(),
                actual: labels.len(),
            });
        }
        if let Some(values) = values {
            if values.len() != data.len() {
                return Err(ClassifyError::DimensionMismatch {
                    expected: data.len(),
                    actual: values.len(),
                });
            }
            for (features, vals) in data.iter().zip(values.iter()) {
                if vals.len() != features.len() {
                    return Err(ClassifyError::DimensionMismatch {
                        expected: features.len(),
                        actual: vals.len(),
                    });
                }
            }
        }
        if let Some(weights) = weights {
            if weights.len() != data.len() {
                return Err(ClassifyError::DimensionMismatch {
                    expected: data.len(),
                    actual: weights.len(),
                });
            }
            if let Some(w) = weights.iter().find(|w| **w < 0.0) {
                return Err(ClassifyError::InvalidParameter(format!(
                    "Example weight must be non-negative, got {w}"
                )));
            }
        }
        for &label in labels {
            if label >= num_classes {
                return Err(ClassifyError::InvalidLabel {
                    label,
                    num_classes,
                });
            }
        }
        for features in data {
            if let Some(&f) = features.iter().find(|f| **f >= num_features) {
                return Err(ClassifyError::InvalidParameter(format!(
                    "Feature id {f} out of range [0, {num_features})"
                )));
            }
        }

        Ok(Self {
            num_features,
            num_classes,
            data,
            values,
            labels,
            weights,
        })
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the view is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Weight of example `d` (1.0 when unweighted)
    pub fn weight(&self, d: usize) -> f64 {
        self.weights.map_or(1.0, |ws| ws[d] as f64)
    }

    /// Value of the feature at position `pos` of example `d`
    /// (1.0 for categorical data)
    pub fn value(&self, d: usize, pos: usize) -> f64 {
        self.values.map_or(1.0, |vs| vs[d][pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ClassifyError;

    fn toy_dataset() -> Dataset<&'static str, &'static str> {
        let mut dataset = Dataset::new();
        dataset
            .add(&Datum::new(vec!["a", "b"], "pos"))
            .expect("add should succeed");
        dataset
            .add(&Datum::new(vec!["b", "c"], "neg"))
            .expect("add should succeed");
        dataset
    }

    #[test]
    fn test_dataset_indexing() {
        let dataset = toy_dataset();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.num_features(), 3);
        assert_eq!(dataset.num_classes(), 2);
        assert_eq!(dataset.feature_index().index_of(&"a"), Some(0));
        assert_eq!(dataset.feature_index().index_of(&"c"), Some(2));
        assert_eq!(dataset.label_index().index_of(&"neg"), Some(1));
    }

    #[test]
    fn test_dataset_indexed_view() {
        let dataset = toy_dataset();
        let view = dataset.indexed().expect("view should validate");

        assert_eq!(view.data, &[vec![0, 1], vec![1, 2]]);
        assert_eq!(view.labels, &[0, 1]);
        assert!(view.values.is_none());
        assert_eq!(view.weight(0), 1.0);
        assert_eq!(view.value(0, 1), 1.0);
    }

    #[test]
    fn test_dataset_weighted() {
        let mut dataset = toy_dataset();
        dataset
            .add_weighted(&Datum::new(vec!["a"], "pos"), 2.5)
            .expect("weighted add should succeed");

        let view = dataset.indexed().unwrap();
        // Earlier unweighted examples backfill to 1.0
        assert_eq!(view.weights, Some(&[1.0f32, 1.0, 2.5][..]));
        assert_eq!(view.weight(2), 2.5);
    }

    #[test]
    fn test_dataset_rejects_negative_weight() {
        let mut dataset: Dataset<&str, &str> = Dataset::new();
        let result = dataset.add_weighted(&Datum::new(vec!["a"], "pos"), -1.0);
        assert!(matches!(result, Err(ClassifyError::InvalidParameter(_))));
    }

    #[test]
    fn test_dataset_rejects_mixed_kinds() {
        let mut dataset = toy_dataset();
        let rvf = Datum::with_values(vec!["a"], vec![0.5], "pos");
        assert!(matches!(
            dataset.add(&rvf),
            Err(ClassifyError::NotSupported(_))
        ));
    }

    #[test]
    fn test_feature_count_threshold() {
        let mut dataset = Dataset::new();
        dataset.add(&Datum::new(vec!["rare", "common"], "pos")).unwrap();
        dataset.add(&Datum::new(vec!["common"], "neg")).unwrap();
        dataset.add(&Datum::new(vec!["common", "other"], "pos")).unwrap();

        dataset.apply_feature_count_threshold(2);

        // Only "common" survives; it is re-indexed to 0
        assert_eq!(dataset.num_features(), 1);
        assert_eq!(dataset.feature_index().index_of(&"common"), Some(0));
        let view = dataset.indexed().unwrap();
        assert_eq!(view.data, &[vec![0], vec![0], vec![0]]);
    }

    #[test]
    fn test_feature_count_threshold_rvf_keeps_values_parallel() {
        let mut dataset = Dataset::new();
        dataset
            .add(&Datum::with_values(vec!["x", "y"], vec![1.5, 2.5], "pos"))
            .unwrap();
        dataset
            .add(&Datum::with_values(vec!["y"], vec![3.5], "neg"))
            .unwrap();

        dataset.apply_feature_count_threshold(2);

        let view = dataset.indexed().unwrap();
        assert_eq!(view.data, &[vec![0], vec![0]]);
        assert_eq!(view.values.unwrap(), &[vec![2.5], vec![3.5]]);
    }

    #[test]
    fn test_indexed_examples_rejects_bad_label() {
        let data = vec![vec![0]];
        let labels = vec![3];
        let result = IndexedExamples::new(1, 2, &data, None, &labels, None);
        assert!(matches!(
            result,
            Err(ClassifyError::InvalidLabel { label: 3, num_classes: 2 })
        ));
    }

    #[test]
    fn test_indexed_examples_rejects_length_mismatch() {
        let data = vec![vec![0], vec![0]];
        let labels = vec![0];
        let result = IndexedExamples::new(1, 1, &data, None, &labels, None);
        assert!(matches!(
            result,
            Err(ClassifyError::DimensionMismatch { .. })
        ));
    }
}
