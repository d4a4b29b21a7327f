//! Core types, traits, and errors

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ClassifyError, Result};
pub use traits::{Classifier, Evaluation, Minimizer, Objective, ProbabilisticClassifier};
pub use types::{Datum, Index, MinimizerConfig, SparseVector};
