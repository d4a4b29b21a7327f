//! Perceptron and averaged perceptron updaters

use crate::core::{ClassifyError, Result};
use crate::online::{UpdateInstance, WeightUpdater};
use std::collections::HashMap;

/// Plain perceptron: `delta_w = learning_rate * (gold - guessed)`.
///
/// The learning rate is multiplied by a decay factor at each epoch end
/// (default 1.0, no decay).
#[derive(Debug, Clone)]
pub struct PerceptronUpdater {
    learning_rate: f64,
    decay: f64,
    weights: HashMap<usize, f64>,
}

impl PerceptronUpdater {
    /// Create an updater with the given learning rate and no decay
    pub fn new(learning_rate: f64) -> Result<Self> {
        Self::with_decay(learning_rate, 1.0)
    }

    /// Create an updater whose learning rate is multiplied by `decay`
    /// at each epoch end
    pub fn with_decay(learning_rate: f64, decay: f64) -> Result<Self> {
        if learning_rate <= 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Learning rate must be positive, got {learning_rate}"
            )));
        }
        if decay <= 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Decay multiplier must be positive, got {decay}"
            )));
        }
        Ok(Self {
            learning_rate,
            decay,
            weights: HashMap::new(),
        })
    }

    /// Current learning rate
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl WeightUpdater for PerceptronUpdater {
    fn update_skipped(&mut self, batch: &[UpdateInstance], _skip: u64) -> Result<()> {
        for instance in batch {
            for (i, v) in instance.feature_diff.iter() {
                *self.weights.entry(i).or_insert(0.0) += self.learning_rate * v;
            }
        }
        Ok(())
    }

    fn end_epoch(&mut self) {
        self.learning_rate *= self.decay;
    }

    fn weights(&self) -> HashMap<usize, f64> {
        self.weights.clone()
    }

    fn weight(&self, feature: usize) -> f64 {
        self.weights.get(&feature).copied().unwrap_or(0.0)
    }
}

/// Per-feature accumulator state for lazy averaging
#[derive(Debug, Clone, Copy, Default)]
struct AveragedEntry {
    /// Current raw weight
    weight: f64,
    /// Time-integral of the raw weight up to `last_update`
    summed: f64,
    /// Last timestep whose contribution is already in `summed`
    last_update: u64,
}

/// Averaged perceptron (Collins 2002).
///
/// Maintains, per feature, the raw weight, the running time-integral of
/// the raw weight, and the last update timestep. The integral is only
/// advanced for features touched by an update ("lazy averaging"), so
/// untouched dimensions cost nothing per step while `weights` still
/// returns the exact mean of the raw weight trajectory over all
/// timesteps seen so far.
///
/// The clock advances by one per update call, or by an explicit skip
/// count covering correctly classified examples in between.
#[derive(Debug, Clone)]
pub struct AveragedPerceptronUpdater {
    learning_rate: f64,
    decay: f64,
    entries: HashMap<usize, AveragedEntry>,
    time: u64,
}

impl AveragedPerceptronUpdater {
    /// Create an updater with the given learning rate and no decay
    pub fn new(learning_rate: f64) -> Result<Self> {
        Self::with_decay(learning_rate, 1.0)
    }

    /// Create an updater whose learning rate is multiplied by `decay`
    /// at each epoch end
    pub fn with_decay(learning_rate: f64, decay: f64) -> Result<Self> {
        if learning_rate <= 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Learning rate must be positive, got {learning_rate}"
            )));
        }
        if decay <= 0.0 {
            return Err(ClassifyError::InvalidParameter(format!(
                "Decay multiplier must be positive, got {decay}"
            )));
        }
        Ok(Self {
            learning_rate,
            decay,
            entries: HashMap::new(),
            time: 0,
        })
    }

    /// Timesteps seen so far
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Averaged weight of one entry as of the current clock
    fn averaged(&self, entry: &AveragedEntry) -> f64 {
        if self.time == 0 {
            return 0.0;
        }
        let pending = (self.time - entry.last_update) as f64 * entry.weight;
        (entry.summed + pending) / self.time as f64
    }
}

impl WeightUpdater for AveragedPerceptronUpdater {
    fn update_skipped(&mut self, batch: &[UpdateInstance], skip: u64) -> Result<()> {
        self.time += skip.max(1);

        // Merge the batch into one delta per feature so each feature is
        // refreshed exactly once for this timestep
        let mut deltas: HashMap<usize, f64> = HashMap::new();
        for instance in batch {
            for (i, v) in instance.feature_diff.iter() {
                *deltas.entry(i).or_insert(0.0) += self.learning_rate * v;
            }
        }

        for (i, delta) in deltas {
            let entry = self.entries.entry(i).or_default();
            // Credit the old weight for the steps it survived unchanged;
            // the new weight starts counting from this step inclusive
            let settled = self.time - 1;
            entry.summed += (settled - entry.last_update) as f64 * entry.weight;
            entry.last_update = settled;
            entry.weight += delta;
        }
        Ok(())
    }

    fn end_epoch(&mut self) {
        self.learning_rate *= self.decay;
    }

    fn weights(&self) -> HashMap<usize, f64> {
        self.entries
            .iter()
            .map(|(&i, entry)| (i, self.averaged(entry)))
            .collect()
    }

    fn weight(&self, feature: usize) -> f64 {
        self.entries
            .get(&feature)
            .map_or(0.0, |entry| self.averaged(entry))
    }

    fn raw_weight(&self, feature: usize) -> f64 {
        self.entries.get(&feature).map_or(0.0, |e| e.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use approx::assert_relative_eq;

    fn diff(indices: Vec<usize>, values: Vec<f64>) -> Vec<UpdateInstance> {
        vec![UpdateInstance {
            feature_diff: SparseVector::new(indices, values),
            loss: 1.0,
        }]
    }

    #[test]
    fn test_perceptron_accumulates_differences() {
        let mut updater = PerceptronUpdater::new(0.5).unwrap();

        updater.update(&diff(vec![0, 2], vec![1.0, -1.0])).unwrap();
        updater.update(&diff(vec![0], vec![1.0])).unwrap();

        assert_relative_eq!(updater.weight(0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(updater.weight(2), -0.5, epsilon = 1e-12);
        assert_eq!(updater.weight(7), 0.0);
    }

    #[test]
    fn test_perceptron_epoch_decay() {
        let mut updater = PerceptronUpdater::with_decay(1.0, 0.5).unwrap();

        updater.update(&diff(vec![0], vec![1.0])).unwrap();
        updater.end_epoch();
        updater.update(&diff(vec![0], vec![1.0])).unwrap();

        // Second update applied at half the rate
        assert_relative_eq!(updater.weight(0), 1.5, epsilon = 1e-12);
        assert_relative_eq!(updater.learning_rate(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_perceptron_default_no_decay() {
        let mut updater = PerceptronUpdater::new(1.0).unwrap();
        updater.end_epoch();
        assert_relative_eq!(updater.learning_rate(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perceptron_rejects_bad_parameters() {
        assert!(PerceptronUpdater::new(0.0).is_err());
        assert!(PerceptronUpdater::with_decay(1.0, -0.5).is_err());
    }

    #[test]
    fn test_averaged_single_update_is_constant() {
        // A weight set at step 1 and never changed averages to itself
        let mut updater = AveragedPerceptronUpdater::new(1.0).unwrap();
        updater.update(&diff(vec![0], vec![2.0])).unwrap();

        assert_relative_eq!(updater.weight(0), 2.0, epsilon = 1e-12);

        // Let time pass without touching feature 0
        updater.update_skipped(&[], 9).unwrap();
        assert_relative_eq!(updater.weight(0), 2.0, epsilon = 1e-12);
        assert_eq!(updater.time(), 10);
    }

    #[test]
    fn test_averaged_matches_direct_simulation() {
        // Replay a fixed update schedule both lazily and by brute force
        let schedule: Vec<(u64, Vec<(usize, f64)>)> = vec![
            (1, vec![(0, 1.0), (1, -0.5)]),
            (3, vec![(0, 0.5)]),
            (4, vec![(2, 2.0)]),
            (9, vec![(0, -1.0), (2, 1.0)]),
        ];
        let horizon = 12u64;

        let mut updater = AveragedPerceptronUpdater::new(1.0).unwrap();
        let mut prev_time = 0u64;
        for (t, deltas) in &schedule {
            let (indices, values): (Vec<_>, Vec<_>) = deltas.iter().copied().unzip();
            updater
                .update_skipped(&diff(indices, values), t - prev_time)
                .unwrap();
            prev_time = *t;
        }
        updater.update_skipped(&[], horizon - prev_time).unwrap();

        // Direct simulation: dense raw weights, integrate after each step
        let mut raw = vec![0.0f64; 3];
        let mut integral = vec![0.0f64; 3];
        for t in 1..=horizon {
            if let Some((_, deltas)) = schedule.iter().find(|(st, _)| *st == t) {
                for &(i, v) in deltas {
                    raw[i] += v;
                }
            }
            for i in 0..3 {
                integral[i] += raw[i];
            }
        }

        for i in 0..3 {
            assert_relative_eq!(
                updater.weight(i),
                integral[i] / horizon as f64,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_averaged_weights_read_does_not_mutate() {
        let mut updater = AveragedPerceptronUpdater::new(1.0).unwrap();
        updater.update(&diff(vec![0], vec![1.0])).unwrap();
        updater.update_skipped(&[], 4).unwrap();

        let first = updater.weights();
        let second = updater.weights();
        assert_eq!(first, second);
        assert_eq!(updater.time(), 5);
    }

    #[test]
    fn test_averaged_raw_vs_averaged() {
        let mut updater = AveragedPerceptronUpdater::new(1.0).unwrap();
        updater.update(&diff(vec![0], vec![1.0])).unwrap();
        updater.update(&diff(vec![0], vec![1.0])).unwrap();

        // Raw weight is 2; trajectory was [1, 2] so the average is 1.5
        assert_relative_eq!(updater.raw_weight(0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(updater.weight(0), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_averaged_clone_snapshots_state() {
        let mut updater = AveragedPerceptronUpdater::new(1.0).unwrap();
        updater.update(&diff(vec![0], vec![1.0])).unwrap();

        let snapshot = updater.clone();
        updater.update(&diff(vec![0], vec![5.0])).unwrap();

        // The snapshot is unaffected by later updates
        assert_relative_eq!(snapshot.weight(0), 1.0, epsilon = 1e-12);
        assert_ne!(snapshot.weight(0), updater.weight(0));
    }
}
