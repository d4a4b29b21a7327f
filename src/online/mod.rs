//! Online weight updaters
//!
//! Updaters consume per-example gold/guessed feature differences and
//! losses over dense feature ids and maintain an incremental weight
//! accumulator. They are independent of the batch objective path: a
//! driver scores examples against the current weights, builds the
//! difference vectors, and feeds them back in.

pub mod mira;
pub mod perceptron;

pub use self::mira::{MiraConfig, MiraUpdater};
pub use self::perceptron::{AveragedPerceptronUpdater, PerceptronUpdater};

use crate::core::{Result, SparseVector};
use std::collections::HashMap;

/// One observed mistake: the gold-minus-guessed feature difference and
/// the loss incurred by the guess
#[derive(Debug, Clone)]
pub struct UpdateInstance {
    /// `gold - guessed` over dense feature ids
    pub feature_diff: SparseVector,
    /// Loss of the guess relative to gold (non-negative)
    pub loss: f64,
}

impl UpdateInstance {
    /// Build an instance from gold and guessed feature vectors
    pub fn from_vectors(gold: &SparseVector, guessed: &SparseVector, loss: f64) -> Self {
        Self {
            feature_diff: SparseVector::difference(gold, guessed),
            loss,
        }
    }
}

/// Incremental weight-update rule.
///
/// Lifecycle per training run: construct, then `update` once per example
/// or mini-batch, `end_epoch` between passes, and read `weights` at any
/// point without disturbing the state. Updaters are plain values: clone
/// one to snapshot its state for a held-out fold.
pub trait WeightUpdater {
    /// Apply one update, advancing the updater's clock by one step
    fn update(&mut self, batch: &[UpdateInstance]) -> Result<()> {
        self.update_skipped(batch, 1)
    }

    /// Apply one update, advancing the clock by `skip` steps (covering
    /// examples that were scored correctly and produced no update)
    fn update_skipped(&mut self, batch: &[UpdateInstance], skip: u64) -> Result<()>;

    /// Transition between epochs (learning-rate decay for perceptrons)
    fn end_epoch(&mut self);

    /// The effective weights (averaged where the rule averages)
    fn weights(&self) -> HashMap<usize, f64>;

    /// Effective weight of one feature (0.0 if never touched)
    fn weight(&self, feature: usize) -> f64;

    /// The current hypothesis weight of one feature, used for scoring
    /// during training; identical to `weight` except where the rule
    /// averages, which exposes the raw trajectory here
    fn raw_weight(&self, feature: usize) -> f64 {
        self.weight(feature)
    }
}
