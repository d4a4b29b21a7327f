//! Rust implementation of log-linear (maximum entropy) classifiers
//!
//! Discriminative trainers over sparse feature vectors: batch
//! conditional-likelihood training with pluggable priors and minimizers,
//! and online learning with perceptron, averaged perceptron, and MIRA
//! updates.

pub mod api;
pub mod cache;
pub mod classifier;
pub mod core;
pub mod dataset;
pub mod objective;
pub mod online;
pub mod persistence;
pub mod prior;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{evaluate, evaluate_detailed, LogLinear, OnlineTrainer, PriorKind, UpdateRule};
pub use crate::cache::{CachingObjective, EvaluationCache};
pub use crate::classifier::{LinearClassifier, MultinomialLogisticClassifier};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{ClassifyError, Result};
pub use crate::dataset::{Dataset, IndexedExamples};
pub use crate::objective::{
    BiasedLogConditionalObjective, LogConditionalObjective, MultinomialLogisticObjective,
    SemiSupervisedObjective, ShiftParamsLogisticObjective,
};
pub use crate::online::{
    AveragedPerceptronUpdater, MiraUpdater, PerceptronUpdater, UpdateInstance, WeightUpdater,
};
pub use crate::prior::{
    AdaptedPrior, HuberPrior, NullPrior, Prior, QuadraticPrior, QuarticPrior,
};
pub use crate::solver::{GradientDescentMinimizer, MinimizerKind, QnMinimizer};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
