//! ITN Usage Inference Engine
//!
//! Runs the pre-trained usage classifier over encoded feature rows and decodes
//! its class indices into human-readable labels.

mod classifier;
mod decoder;
mod engine;
mod simulation;

pub use classifier::{Classifier, OnnxClassifier};
pub use decoder::LabelDecoder;
pub use engine::{BatchPrediction, InferenceEngine};
pub use simulation::SimulationRunner;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Class index {index} has no label (decoder knows {vocabulary_size} classes)")]
    UnknownClass { index: usize, vocabulary_size: usize },
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use feature_engine::{EncodedFeatureRow, FeatureSlot};

    /// Predicts "Uses ITN" whenever the attitude code is positive
    pub struct AttitudeRule;

    impl Classifier for AttitudeRule {
        fn predict(&self, rows: &[EncodedFeatureRow]) -> Result<Vec<usize>, InferenceError> {
            Ok(rows
                .iter()
                .map(|row| usize::from(row.get(FeatureSlot::ItnAttitude) > 0))
                .collect())
        }
    }

    /// Always predicts the same class index
    pub struct FixedClass(pub usize);

    impl Classifier for FixedClass {
        fn predict(&self, rows: &[EncodedFeatureRow]) -> Result<Vec<usize>, InferenceError> {
            Ok(vec![self.0; rows.len()])
        }
    }

    pub fn engine(classifier: impl Classifier + 'static) -> InferenceEngine {
        let decoder =
            LabelDecoder::new(vec!["Does not use ITN".into(), "Uses ITN".into()]).unwrap();
        InferenceEngine::new(Box::new(classifier), decoder)
    }
}
