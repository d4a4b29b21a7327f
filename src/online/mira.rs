//! MIRA: margin-infused relaxed algorithm

use crate::core::{Result, SparseVector};
use crate::online::{UpdateInstance, WeightUpdater};
use crate::solver::{hildreth, HildrethConfig};
use std::collections::HashMap;

/// Configuration for MIRA updates
#[derive(Debug, Clone, Default)]
pub struct MiraConfig {
    /// Settings for the inner Hildreth QP solves
    pub hildreth: HildrethConfig,
}

/// MIRA updater: the smallest weight change satisfying the batch's
/// margin constraints.
///
/// For a mini-batch of mistakes, each constraint demands
/// `score(gold) - score(guessed) >= loss`. The dual variables are found
/// with Hildreth's algorithm over the constraint targets
/// `loss_i - feature_diff_i . w` and the update is
/// `sum_i alpha_i * feature_diff_i`. Constraints already satisfied get
/// zero duals and leave the weights alone.
#[derive(Debug, Clone)]
pub struct MiraUpdater {
    config: MiraConfig,
    weights: HashMap<usize, f64>,
}

impl MiraUpdater {
    /// Create an updater with default QP settings
    pub fn new() -> Self {
        Self::with_config(MiraConfig::default())
    }

    /// Create an updater with explicit QP settings
    pub fn with_config(config: MiraConfig) -> Self {
        Self {
            config,
            weights: HashMap::new(),
        }
    }

    /// Sparse dot of a difference vector against the current weights
    fn score_diff(&self, diff: &SparseVector) -> f64 {
        diff.iter()
            .map(|(i, v)| v * self.weights.get(&i).copied().unwrap_or(0.0))
            .sum()
    }
}

impl Default for MiraUpdater {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightUpdater for MiraUpdater {
    fn update_skipped(&mut self, batch: &[UpdateInstance], _skip: u64) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let constraints: Vec<SparseVector> =
            batch.iter().map(|inst| inst.feature_diff.clone()).collect();
        let targets: Vec<f64> = batch
            .iter()
            .map(|inst| inst.loss - self.score_diff(&inst.feature_diff))
            .collect();

        let alphas = hildreth(&constraints, &targets, &self.config.hildreth)?;

        for (alpha, diff) in alphas.iter().zip(constraints.iter()) {
            if *alpha == 0.0 {
                continue;
            }
            for (i, v) in diff.iter() {
                *self.weights.entry(i).or_insert(0.0) += alpha * v;
            }
        }
        Ok(())
    }

    fn end_epoch(&mut self) {}

    fn weights(&self) -> HashMap<usize, f64> {
        self.weights.clone()
    }

    fn weight(&self, feature: usize) -> f64 {
        self.weights.get(&feature).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(indices: Vec<usize>, values: Vec<f64>, loss: f64) -> UpdateInstance {
        UpdateInstance {
            feature_diff: SparseVector::new(indices, values),
            loss,
        }
    }

    /// Margin achieved by the current weights on an instance
    fn margin(updater: &MiraUpdater, inst: &UpdateInstance) -> f64 {
        inst.feature_diff
            .iter()
            .map(|(i, v)| v * updater.weight(i))
            .sum()
    }

    #[test]
    fn test_single_constraint_met_exactly() {
        let mut updater = MiraUpdater::new();
        let inst = instance(vec![0, 1], vec![1.0, -1.0], 1.0);

        updater.update(&[inst.clone()]).unwrap();

        // The margin constraint holds with equality at the minimal update
        let achieved = margin(&updater, &inst);
        assert!(
            achieved >= inst.loss - 1e-6,
            "Margin {achieved} below loss {}",
            inst.loss
        );
        assert!((achieved - inst.loss).abs() < 1e-6);
    }

    #[test]
    fn test_satisfied_constraint_leaves_weights_alone() {
        let mut updater = MiraUpdater::new();
        updater
            .update(&[instance(vec![0], vec![1.0], 2.0)])
            .unwrap();
        let before = updater.weights();

        // Already separated by a margin of 2: no further change
        updater
            .update(&[instance(vec![0], vec![1.0], 2.0)])
            .unwrap();
        let after = updater.weights();

        for (i, w) in before {
            assert!((after[&i] - w).abs() < 1e-6);
        }
    }

    #[test]
    fn test_batch_constraints_all_satisfied() {
        let mut updater = MiraUpdater::new();
        let batch = vec![
            instance(vec![0, 1], vec![1.0, -1.0], 1.0),
            instance(vec![1, 2], vec![1.0, -1.0], 0.5),
            instance(vec![0, 2], vec![2.0, -1.0], 1.5),
        ];

        updater.update(&batch).unwrap();

        for (k, inst) in batch.iter().enumerate() {
            let achieved = margin(&updater, inst);
            assert!(
                achieved >= inst.loss - 1e-4,
                "Constraint {k}: margin {achieved} below loss {}",
                inst.loss
            );
        }
    }

    #[test]
    fn test_update_is_minimal_in_norm() {
        // For one constraint the MIRA update is alpha * diff with
        // alpha = loss / |diff|^2; anything smaller violates the margin
        let mut updater = MiraUpdater::new();
        let inst = instance(vec![0], vec![2.0], 1.0);
        updater.update(&[inst]).unwrap();

        // alpha = 1 / 4, update = 0.5 on feature 0
        assert!((updater.weight(0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut updater = MiraUpdater::new();
        updater.update(&[]).unwrap();
        assert!(updater.weights().is_empty());
    }

    #[test]
    fn test_clone_snapshots_state() {
        let mut updater = MiraUpdater::new();
        updater
            .update(&[instance(vec![0], vec![1.0], 1.0)])
            .unwrap();

        let snapshot = updater.clone();
        updater
            .update(&[instance(vec![0], vec![-1.0], 3.0)])
            .unwrap();

        assert!((snapshot.weight(0) - 1.0).abs() < 1e-6);
        assert_ne!(snapshot.weight(0), updater.weight(0));
    }
}
