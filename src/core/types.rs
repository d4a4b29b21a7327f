//! Core type definitions for log-linear classification

use std::collections::HashMap;
use std::hash::Hash;

/// Insertion-ordered bidirectional mapping between objects and dense ids.
///
/// Ids are assigned contiguously from 0 in insertion order and stay stable
/// for the lifetime of the index. A locked index refuses new entries, which
/// is how trained classifiers freeze their feature and label spaces.
/// Persistence stores the items in id order and rebuilds the map on load.
#[derive(Debug, Clone)]
pub struct Index<T: Eq + Hash + Clone> {
    items: Vec<T>,
    ids: HashMap<T, usize>,
    locked: bool,
}

impl<T: Eq + Hash + Clone> Index<T> {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            ids: HashMap::new(),
            locked: false,
        }
    }

    /// Add an item, returning its id.
    ///
    /// Existing items return their original id. New items on a locked index
    /// are refused and `None` is returned.
    pub fn add(&mut self, item: T) -> Option<usize> {
        if let Some(&id) = self.ids.get(&item) {
            return Some(id);
        }
        if self.locked {
            return None;
        }
        let id = self.items.len();
        self.items.push(item.clone());
        self.ids.insert(item, id);
        Some(id)
    }

    /// Look up the id of an item without inserting
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.ids.get(item).copied()
    }

    /// Look up the item for an id
    pub fn get(&self, id: usize) -> Option<&T> {
        self.items.get(id)
    }

    /// Number of items in the index
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check membership
    pub fn contains(&self, item: &T) -> bool {
        self.ids.contains_key(item)
    }

    /// Freeze the index: subsequent unseen items are refused by `add`
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Whether the index is frozen
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Iterate items in id order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: Eq + Hash + Clone> Default for Index<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for Index<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut index = Self::new();
        for item in iter {
            index.add(item);
        }
        index
    }
}

/// Sparse vector over dense feature ids with sorted indices.
///
/// Used on the online-learning path for gold/guessed feature-difference
/// vectors and for incremental weight deltas.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted.
    ///
    /// Duplicate indices are merged by summing their values, so
    /// count-valued features collapse to a single entry.
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let mut indices = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (idx, v) in pairs {
            if indices.last() == Some(&idx) {
                *values.last_mut().unwrap() += v;
            } else {
                indices.push(idx);
                values.push(v);
            }
        }
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Difference `gold - guessed` over dense feature ids
    pub fn difference(gold: &Self, guessed: &Self) -> Self {
        let mut indices = Vec::new();
        let mut values = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < gold.indices.len() || j < guessed.indices.len() {
            let gi = gold.indices.get(i).copied().unwrap_or(usize::MAX);
            let gj = guessed.indices.get(j).copied().unwrap_or(usize::MAX);
            if gi == gj {
                let v = gold.values[i] - guessed.values[j];
                if v != 0.0 {
                    indices.push(gi);
                    values.push(v);
                }
                i += 1;
                j += 1;
            } else if gi < gj {
                indices.push(gi);
                values.push(gold.values[i]);
                i += 1;
            } else {
                indices.push(gj);
                values.push(-guessed.values[j]);
                j += 1;
            }
        }
        Self { indices, values }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Dot product with another sparse vector.
    ///
    /// Both index lists are sorted, so this walks them merge-style in
    /// O(nnz(self) + nnz(other)).
    pub fn dot(&self, other: &Self) -> f64 {
        let mut result = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            if self.indices[i] == other.indices[j] {
                result += self.values[i] * other.values[j];
                i += 1;
                j += 1;
            } else if self.indices[i] < other.indices[j] {
                i += 1;
            } else {
                j += 1;
            }
        }
        result
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate `(index, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

/// A single labeled example with symbolic features.
///
/// Duplicate features are allowed and act as counts. Real-valued examples
/// carry a parallel value per feature; categorical examples leave `values`
/// unset and every feature contributes 1.0.
#[derive(Debug, Clone)]
pub struct Datum<F, L> {
    /// Symbolic features (duplicates allowed for count-valued features)
    pub features: Vec<F>,
    /// Per-feature real values, parallel to `features`, if real-valued
    pub values: Option<Vec<f64>>,
    /// The observed label
    pub label: L,
}

impl<F, L> Datum<F, L> {
    /// Create a categorical datum (all feature values implicitly 1.0)
    pub fn new(features: Vec<F>, label: L) -> Self {
        Self {
            features,
            values: None,
            label,
        }
    }

    /// Create a real-valued datum with one value per feature
    ///
    /// # Panics
    /// Panics if `features` and `values` differ in length.
    pub fn with_values(features: Vec<F>, values: Vec<f64>, label: L) -> Self {
        assert_eq!(
            features.len(),
            values.len(),
            "Features and values must have same length"
        );
        Self {
            features,
            values: Some(values),
            label,
        }
    }
}

/// Configuration for the numerical minimizer
#[derive(Debug, Clone)]
pub struct MinimizerConfig {
    /// Convergence tolerance on the gradient norm, scaled by the value
    pub tolerance: f64,
    /// Maximum number of outer iterations
    pub max_iterations: usize,
    /// Number of curvature pairs kept by the quasi-Newton history
    pub memory: usize,
    /// Maximum step halvings per line search
    pub max_line_search_steps: usize,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 1000,
            memory: 10,
            max_line_search_steps: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_insertion_order() {
        let mut index = Index::new();
        assert_eq!(index.add("a"), Some(0));
        assert_eq!(index.add("b"), Some(1));
        assert_eq!(index.add("c"), Some(2));

        // Re-adding returns the original id
        assert_eq!(index.add("a"), Some(0));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_index_lookup() {
        let mut index = Index::new();
        index.add("x");
        index.add("y");

        assert_eq!(index.index_of(&"x"), Some(0));
        assert_eq!(index.index_of(&"y"), Some(1));
        assert_eq!(index.index_of(&"z"), None);
        assert_eq!(index.get(0), Some(&"x"));
        assert_eq!(index.get(5), None);
    }

    #[test]
    fn test_index_lock() {
        let mut index = Index::new();
        index.add("seen");
        index.lock();

        // Known items still resolve, unseen items are refused
        assert_eq!(index.add("seen"), Some(0));
        assert_eq!(index.add("unseen"), None);
        assert_eq!(index.len(), 1);
        assert!(index.is_locked());
    }

    #[test]
    fn test_index_from_iterator() {
        let index: Index<&str> = ["a", "b", "a", "c"].into_iter().collect();
        assert_eq!(index.len(), 3);
        assert_eq!(index.index_of(&"c"), Some(2));
    }

    #[test]
    fn test_sparse_vector_creation() {
        let sv = SparseVector::new(vec![2, 0, 4], vec![2.0, 1.0, 3.0]);

        // Indices come out sorted
        assert_eq!(sv.indices, vec![0, 2, 4]);
        assert_eq!(sv.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sparse_vector_merges_duplicates() {
        // Count-valued features: the same index twice sums
        let sv = SparseVector::new(vec![3, 1, 3], vec![1.0, 2.0, 0.5]);
        assert_eq!(sv.indices, vec![1, 3]);
        assert_eq!(sv.values, vec![2.0, 1.5]);
    }

    #[test]
    fn test_sparse_vector_get() {
        let sv = SparseVector::new(vec![1, 3, 5], vec![1.0, 2.0, 3.0]);

        assert_eq!(sv.get(0), 0.0);
        assert_eq!(sv.get(1), 1.0);
        assert_eq!(sv.get(3), 2.0);
        assert_eq!(sv.get(6), 0.0);
    }

    #[test]
    fn test_sparse_vector_dot() {
        let x = SparseVector::new(vec![0, 2, 5], vec![1.0, 3.0, 2.0]);
        let y = SparseVector::new(vec![2, 3, 5], vec![2.0, 1.0, 4.0]);

        // Overlap at indices 2 and 5: 3*2 + 2*4 = 14
        assert_eq!(x.dot(&y), 14.0);
        assert_eq!(y.dot(&x), 14.0);
        assert_eq!(x.dot(&SparseVector::empty()), 0.0);
    }

    #[test]
    fn test_sparse_vector_difference() {
        let gold = SparseVector::new(vec![0, 2], vec![1.0, 1.0]);
        let guessed = SparseVector::new(vec![1, 2], vec![1.0, 1.0]);

        let diff = SparseVector::difference(&gold, &guessed);
        assert_eq!(diff.indices, vec![0, 1]);
        assert_eq!(diff.values, vec![1.0, -1.0]);

        // Identical vectors cancel entirely
        let zero = SparseVector::difference(&gold, &gold);
        assert!(zero.is_empty());
    }

    #[test]
    fn test_sparse_vector_norm() {
        let sv = SparseVector::new(vec![0, 1], vec![3.0, 4.0]);
        assert_eq!(sv.norm_squared(), 25.0);
        assert_eq!(sv.nnz(), 2);
    }

    #[test]
    #[should_panic(expected = "Indices and values must have same length")]
    fn test_sparse_vector_length_mismatch() {
        SparseVector::new(vec![0, 1], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_datum_categorical() {
        let datum = Datum::new(vec!["f1", "f2", "f1"], "pos");
        assert_eq!(datum.features.len(), 3);
        assert!(datum.values.is_none());
        assert_eq!(datum.label, "pos");
    }

    #[test]
    fn test_datum_real_valued() {
        let datum = Datum::with_values(vec!["f1", "f2"], vec![0.5, 2.0], "neg");
        assert_eq!(datum.values.as_ref().unwrap(), &vec![0.5, 2.0]);
    }

    #[test]
    #[should_panic(expected = "Features and values must have same length")]
    fn test_datum_length_mismatch() {
        Datum::with_values(vec!["f1"], vec![1.0, 2.0], "pos");
    }

    #[test]
    fn test_minimizer_config_default() {
        let config = MinimizerConfig::default();
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.memory, 10);
    }
}
