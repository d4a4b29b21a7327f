//! High-level API for training and evaluating classifiers
//!
//! This module provides a user-friendly interface over the objective,
//! prior, solver, and online-updater layers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rmaxent::api::LogLinear;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model on SVM-light data
//! let model = LogLinear::new()
//!     .with_sigma(1.0)
//!     .with_tolerance(1e-4)
//!     .train_from_svmlight("train.svmlight")?;
//!
//! // Evaluate on held-out data
//! let dataset = rmaxent::dataset::svmlight::read_file("test.svmlight")?;
//! println!("Accuracy: {:.2}%", rmaxent::api::evaluate(&model, &dataset)? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::cache::CachingObjective;
use crate::classifier::LinearClassifier;
use crate::core::{
    Classifier, ClassifyError, Datum, MinimizerConfig, Result, SparseVector,
};
use crate::dataset::{svmlight, Dataset};
use crate::objective::{flat_index, LogConditionalObjective};
use crate::online::{
    AveragedPerceptronUpdater, MiraUpdater, PerceptronUpdater, UpdateInstance, WeightUpdater,
};
use crate::prior::{HuberPrior, NullPrior, Prior, QuadraticPrior, QuarticPrior};
use crate::solver::{create_minimizer, MinimizerKind};
use crate::utils::math::argmax;
use log::{debug, info};
use std::hash::Hash;
use std::path::Path;

/// Prior family selected on the batch trainer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriorKind {
    /// Gaussian prior with the trainer's sigma (default)
    Quadratic,
    /// Huber prior with the trainer's sigma and the given epsilon
    Huber { epsilon: f64 },
    /// Quartic prior with the trainer's sigma
    Quartic,
    /// No regularization
    None,
}

/// Batch log-linear trainer with builder pattern
pub struct LogLinear {
    sigma: f64,
    prior: PriorKind,
    tolerance: f64,
    minimizer: MinimizerKind,
    minimizer_config: MinimizerConfig,
}

impl LogLinear {
    /// Create a trainer with a quadratic prior (sigma 1.0) and the
    /// quasi-Newton minimizer
    pub fn new() -> Self {
        Self {
            sigma: 1.0,
            prior: PriorKind::Quadratic,
            tolerance: 1e-4,
            minimizer: MinimizerKind::QuasiNewton,
            minimizer_config: MinimizerConfig::default(),
        }
    }

    /// Set the prior's sigma
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Select the prior family
    pub fn with_prior(mut self, prior: PriorKind) -> Self {
        self.prior = prior;
        self
    }

    /// Set the minimizer's convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the minimizer's iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.minimizer_config.max_iterations = max_iterations;
        self
    }

    /// Select the minimizer
    pub fn with_minimizer(mut self, minimizer: MinimizerKind) -> Self {
        self.minimizer = minimizer;
        self
    }

    fn build_prior(&self) -> Result<Box<dyn Prior>> {
        Ok(match self.prior {
            PriorKind::Quadratic => Box::new(QuadraticPrior::new(self.sigma)?),
            PriorKind::Huber { epsilon } => Box::new(HuberPrior::new(self.sigma, epsilon)?),
            PriorKind::Quartic => Box::new(QuarticPrior::new(self.sigma)?),
            PriorKind::None => Box::new(NullPrior::new()),
        })
    }

    /// Train a classifier on a dataset
    pub fn train<F, L>(&self, dataset: &Dataset<F, L>) -> Result<LinearClassifier<F, L>>
    where
        F: Eq + Hash + Clone,
        L: Eq + Hash + Clone,
    {
        if dataset.is_empty() {
            return Err(ClassifyError::EmptyDataset);
        }
        dataset.summary_statistics();

        let view = dataset.indexed()?;
        let objective = CachingObjective::new(LogConditionalObjective::new(
            view,
            self.build_prior()?,
        )?);
        let minimizer = create_minimizer(self.minimizer, self.minimizer_config.clone());

        let dimension = dataset.num_features() * dataset.num_classes();
        info!("Training log-linear model over {dimension} weights");
        let weights = minimizer.minimize(
            &objective,
            self.tolerance,
            &vec![0.0; dimension],
        )?;
        debug!("Evaluation cache hit rate: {:.2}", objective.hit_rate());

        LinearClassifier::new(
            weights,
            dataset.feature_index().clone(),
            dataset.label_index().clone(),
        )
    }

    /// Train from an SVM-light format file
    pub fn train_from_svmlight<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<LinearClassifier<usize, String>> {
        let dataset = svmlight::read_file(path)?;
        self.train(&dataset)
    }
}

impl Default for LogLinear {
    fn default() -> Self {
        Self::new()
    }
}

/// Online update rule selected on the online trainer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRule {
    /// Plain perceptron
    Perceptron,
    /// Averaged perceptron (default)
    AveragedPerceptron,
    /// MIRA with per-example margin constraints
    Mira,
}

/// Online trainer: mistake-driven epochs over a dataset
pub struct OnlineTrainer {
    rule: UpdateRule,
    epochs: usize,
    learning_rate: f64,
    decay: f64,
}

impl OnlineTrainer {
    /// Create a trainer with the given update rule, 10 epochs, learning
    /// rate 1.0, and no decay
    pub fn new(rule: UpdateRule) -> Self {
        Self {
            rule,
            epochs: 10,
            learning_rate: 1.0,
            decay: 1.0,
        }
    }

    /// Set the number of passes over the data
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the perceptron learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the per-epoch learning-rate decay multiplier
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    fn build_updater(&self) -> Result<Box<dyn WeightUpdater>> {
        Ok(match self.rule {
            UpdateRule::Perceptron => {
                Box::new(PerceptronUpdater::with_decay(self.learning_rate, self.decay)?)
            }
            UpdateRule::AveragedPerceptron => Box::new(AveragedPerceptronUpdater::with_decay(
                self.learning_rate,
                self.decay,
            )?),
            UpdateRule::Mira => Box::new(MiraUpdater::new()),
        })
    }

    /// Train a classifier by scoring each example against the current
    /// weights and feeding mistakes to the updater.
    ///
    /// Weights live in the joint `(feature, class)` space with the same
    /// flattened layout the batch path uses, so the result is an ordinary
    /// `LinearClassifier`.
    pub fn train<F, L>(&self, dataset: &Dataset<F, L>) -> Result<LinearClassifier<F, L>>
    where
        F: Eq + Hash + Clone,
        L: Eq + Hash + Clone,
    {
        if dataset.is_empty() {
            return Err(ClassifyError::EmptyDataset);
        }
        let view = dataset.indexed()?;
        let num_classes = view.num_classes;
        let mut updater = self.build_updater()?;
        let mut skip: u64 = 0;

        for epoch in 0..self.epochs {
            let mut mistakes = 0usize;
            for d in 0..view.len() {
                let features = &view.data[d];
                let gold = view.labels[d];

                // Score classes against the current raw hypothesis
                let mut scores = vec![0.0; num_classes];
                for (pos, &f) in features.iter().enumerate() {
                    let v = view.value(d, pos);
                    for (c, score) in scores.iter_mut().enumerate() {
                        *score += updater.raw_weight(flat_index(f, c, num_classes)) * v;
                    }
                }
                let guessed = argmax(&scores).expect("at least one class");

                skip += 1;
                if guessed == gold {
                    continue;
                }
                mistakes += 1;

                let joint = |class: usize| -> SparseVector {
                    let ids = features
                        .iter()
                        .map(|&f| flat_index(f, class, num_classes))
                        .collect();
                    let values = (0..features.len()).map(|pos| view.value(d, pos)).collect();
                    SparseVector::new(ids, values)
                };
                let instance =
                    UpdateInstance::from_vectors(&joint(gold), &joint(guessed), 1.0);
                updater.update_skipped(&[instance], skip)?;
                skip = 0;
            }
            updater.end_epoch();
            info!(
                "Epoch {}: {mistakes}/{} mistakes",
                epoch + 1,
                view.len()
            );
            if mistakes == 0 {
                break;
            }
        }
        if skip > 0 {
            // Credit the trailing correctly classified examples to the
            // averaging clock
            updater.update_skipped(&[], skip)?;
        }

        let mut weights = vec![0.0; view.num_features * num_classes];
        for (i, w) in updater.weights() {
            weights[i] = w;
        }
        LinearClassifier::new(
            weights,
            dataset.feature_index().clone(),
            dataset.label_index().clone(),
        )
    }
}

/// Accuracy of a classifier over a dataset
pub fn evaluate<F, L, C>(classifier: &C, dataset: &Dataset<F, L>) -> Result<f64>
where
    F: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
    C: Classifier<F, L>,
{
    let metrics = evaluate_detailed(classifier, dataset)?;
    Ok(metrics.accuracy())
}

/// Per-class evaluation counts
#[derive(Debug, Clone)]
pub struct EvaluationMetrics<L> {
    /// Number of examples evaluated
    pub total: usize,
    /// Number classified correctly
    pub correct: usize,
    /// Per-label `(label, gold count, predicted count, correct count)`
    pub per_class: Vec<(L, usize, usize, usize)>,
}

impl<L> EvaluationMetrics<L> {
    /// Overall accuracy
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Evaluate a classifier, collecting per-class counts
pub fn evaluate_detailed<F, L, C>(
    classifier: &C,
    dataset: &Dataset<F, L>,
) -> Result<EvaluationMetrics<L>>
where
    F: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
    C: Classifier<F, L>,
{
    let view = dataset.indexed()?;
    let num_classes = dataset.num_classes();
    let mut correct = 0usize;
    let mut gold_counts = vec![0usize; num_classes];
    let mut predicted_counts = vec![0usize; num_classes];
    let mut correct_counts = vec![0usize; num_classes];

    for d in 0..view.len() {
        let features: Vec<F> = view.data[d]
            .iter()
            .map(|&f| dataset.feature_index().get(f).unwrap().clone())
            .collect();
        let values = view.values.map(|vs| vs[d].clone());
        let gold = view.labels[d];
        let datum = Datum {
            features,
            values,
            label: dataset.label_index().get(gold).unwrap().clone(),
        };

        let predicted_label = classifier.class_of(&datum);
        let predicted = dataset
            .label_index()
            .index_of(&predicted_label)
            .expect("predicted label comes from the training index");

        gold_counts[gold] += 1;
        predicted_counts[predicted] += 1;
        if predicted == gold {
            correct += 1;
            correct_counts[gold] += 1;
        }
    }

    let per_class = (0..num_classes)
        .map(|c| {
            (
                dataset.label_index().get(c).unwrap().clone(),
                gold_counts[c],
                predicted_counts[c],
                correct_counts[c],
            )
        })
        .collect();

    Ok(EvaluationMetrics {
        total: view.len(),
        correct,
        per_class,
    })
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a log-linear model on SVM-light data with default parameters
    pub fn train_svmlight<P: AsRef<Path>>(path: P) -> Result<LinearClassifier<usize, String>> {
        LogLinear::new().train_from_svmlight(path)
    }

    /// Train with a custom sigma
    pub fn train_svmlight_with_sigma<P: AsRef<Path>>(
        path: P,
        sigma: f64,
    ) -> Result<LinearClassifier<usize, String>> {
        LogLinear::new().with_sigma(sigma).train_from_svmlight(path)
    }

    /// Quick evaluation: train on a training file, test on a test file
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
    ) -> Result<f64> {
        let model = train_svmlight(train_path)?;
        let test = svmlight::read_file(test_path)?;
        evaluate(&model, &test)
    }
}
