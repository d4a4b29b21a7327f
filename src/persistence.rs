//! Model serialization and persistence
//!
//! Saves and loads trained classifiers as JSON: the flat weights, the
//! feature and label items in id order, and training metadata. Round-trip
//! fidelity only requires `(weights, feature index, label index)`; the
//! metadata is informational.

use crate::classifier::{LinearClassifier, MultinomialLogisticClassifier};
use crate::core::{ClassifyError, Index, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::hash::Hash;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Which parameterization the stored weights use
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Full `num_features * num_classes` log-linear weights
    LogLinear,
    /// Reference-class `(num_classes - 1) * num_features` weights
    MultinomialLogistic,
}

/// Serializable representation of a trained classifier
#[derive(Serialize, Deserialize)]
pub struct SerializableModel<F, L> {
    /// Flat weight vector in the kind's layout
    pub weights: Vec<f64>,
    /// Feature items in id order
    pub features: Vec<F>,
    /// Label items in id order
    pub labels: Vec<L>,
    /// Weight layout
    pub kind: ModelKind,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of features at training time
    pub num_features: usize,
    /// Number of classes at training time
    pub num_classes: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrainingParams {
    pub sigma: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl<F, L> SerializableModel<F, L>
where
    F: Eq + Hash + Clone + Serialize + DeserializeOwned,
    L: Eq + Hash + Clone + Serialize + DeserializeOwned,
{
    /// Capture a trained log-linear classifier
    pub fn from_linear(
        classifier: &LinearClassifier<F, L>,
        training_params: TrainingParams,
    ) -> Self {
        Self {
            weights: classifier.weights().to_vec(),
            features: classifier.feature_index().iter().cloned().collect(),
            labels: classifier.label_index().iter().cloned().collect(),
            kind: ModelKind::LogLinear,
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                num_features: classifier.num_features(),
                num_classes: classifier.num_classes(),
                training_params,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Capture a trained multinomial logistic classifier
    pub fn from_logistic(
        classifier: &MultinomialLogisticClassifier<F, L>,
        training_params: TrainingParams,
    ) -> Self {
        Self {
            weights: classifier.weights().to_vec(),
            features: classifier.feature_index().iter().cloned().collect(),
            labels: classifier.label_index().iter().cloned().collect(),
            kind: ModelKind::MultinomialLogistic,
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                num_features: classifier.num_features(),
                num_classes: classifier.num_classes(),
                training_params,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Rebuild the log-linear classifier this model was captured from
    pub fn to_linear(&self) -> Result<LinearClassifier<F, L>> {
        if self.kind != ModelKind::LogLinear {
            return Err(ClassifyError::NotSupported(
                "Stored model is not in the log-linear layout".to_string(),
            ));
        }
        let feature_index: Index<F> = self.features.iter().cloned().collect();
        let label_index: Index<L> = self.labels.iter().cloned().collect();
        LinearClassifier::new(self.weights.clone(), feature_index, label_index)
    }

    /// Rebuild the multinomial logistic classifier this model was
    /// captured from
    pub fn to_logistic(&self) -> Result<MultinomialLogisticClassifier<F, L>> {
        if self.kind != ModelKind::MultinomialLogistic {
            return Err(ClassifyError::NotSupported(
                "Stored model is not in the multinomial logistic layout".to_string(),
            ));
        }
        let feature_index: Index<F> = self.features.iter().cloned().collect();
        let label_index: Index<L> = self.labels.iter().cloned().collect();
        MultinomialLogisticClassifier::new(self.weights.clone(), feature_index, label_index)
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(ClassifyError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ClassifyError::SerializationError(e.to_string()))
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(ClassifyError::IoError)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| ClassifyError::SerializationError(e.to_string()))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== Classifier Model Summary ===");
        println!("Kind: {:?}", self.kind);
        println!("Features: {}", self.metadata.num_features);
        println!("Classes: {}", self.metadata.num_classes);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!(
            "Training: sigma {}, tolerance {}, max iterations {}",
            self.metadata.training_params.sigma,
            self.metadata.training_params.tolerance,
            self.metadata.training_params.max_iterations
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Classifier, Datum};
    use tempfile::NamedTempFile;

    fn toy_params() -> TrainingParams {
        TrainingParams {
            sigma: 1.0,
            tolerance: 1e-4,
            max_iterations: 1000,
        }
    }

    fn toy_classifier() -> LinearClassifier<String, String> {
        let feature_index: Index<String> =
            ["a".to_string(), "b".to_string()].into_iter().collect();
        let label_index: Index<String> =
            ["neg".to_string(), "pos".to_string()].into_iter().collect();
        LinearClassifier::new(vec![-1.0, 1.0, 0.5, -0.5], feature_index, label_index).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_predictions() {
        let classifier = toy_classifier();
        let model = SerializableModel::from_linear(&classifier, toy_params());

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        model.save_to_file(temp_file.path()).unwrap();

        let loaded: SerializableModel<String, String> =
            SerializableModel::load_from_file(temp_file.path()).unwrap();
        let rebuilt = loaded.to_linear().unwrap();

        let datum = Datum::new(vec!["a".to_string(), "b".to_string()], String::new());
        assert_eq!(rebuilt.class_of(&datum), classifier.class_of(&datum));
        assert_eq!(rebuilt.weights(), classifier.weights());
        assert_eq!(rebuilt.num_features(), 2);
        assert_eq!(rebuilt.num_classes(), 2);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let classifier = toy_classifier();
        let model = SerializableModel::from_linear(&classifier, toy_params());
        assert!(matches!(
            model.to_logistic(),
            Err(ClassifyError::NotSupported(_))
        ));
    }

    #[test]
    fn test_logistic_round_trip() {
        let feature_index: Index<String> =
            ["a".to_string(), "b".to_string()].into_iter().collect();
        let label_index: Index<String> =
            ["ref".to_string(), "other".to_string()].into_iter().collect();
        let classifier =
            MultinomialLogisticClassifier::new(vec![1.5, -0.5], feature_index, label_index)
                .unwrap();

        let model = SerializableModel::from_logistic(&classifier, toy_params());
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        model.save_to_file(temp_file.path()).unwrap();

        let loaded: SerializableModel<String, String> =
            SerializableModel::load_from_file(temp_file.path()).unwrap();
        let rebuilt = loaded.to_logistic().unwrap();
        assert_eq!(rebuilt.weights(), classifier.weights());
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<SerializableModel<String, String>> =
            SerializableModel::load_from_file("/non/existent/model.json");
        assert!(matches!(result, Err(ClassifyError::IoError(_))));
    }
}
