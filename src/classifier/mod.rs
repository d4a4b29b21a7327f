//! Trained classifiers

pub mod linear;
pub mod logistic;

pub use self::linear::LinearClassifier;
pub use self::logistic::MultinomialLogisticClassifier;
