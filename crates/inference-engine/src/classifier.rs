//! Classifier Artifacts

use crate::InferenceError;
use feature_engine::{EncodedFeatureRow, FEATURE_DIMENSION};
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// Pre-trained usage classifier
///
/// Implementations are read-only once constructed and may be shared across
/// threads.
pub trait Classifier: Send + Sync {
    /// Predict one raw class index per row, in row order
    fn predict(&self, rows: &[EncodedFeatureRow]) -> Result<Vec<usize>, InferenceError>;
}

/// ONNX export of the usage classifier, executed with tract
pub struct OnnxClassifier {
    /// Model path
    model_path: String,
    /// Optimized execution plan for a single `[1, 4]` row
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxClassifier {
    /// Load and optimize the ONNX model
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = model_path.as_ref();
        info!("Loading ONNX classifier from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Model loaded successfully");
        Ok(Self {
            model_path: path.display().to_string(),
            plan,
        })
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    fn predict_row(&self, row: &EncodedFeatureRow) -> Result<usize, InferenceError> {
        let values: Vec<f32> = row.values().iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, FEATURE_DIMENSION], &values).map_err(failed)?;

        let outputs = self.plan.run(tvec!(input.into())).map_err(failed)?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("Model produced no outputs".to_string()))?;

        class_from_output(output)
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, rows: &[EncodedFeatureRow]) -> Result<Vec<usize>, InferenceError> {
        debug!("Running ONNX classifier on {} rows", rows.len());
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

fn failed(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::InferenceFailed(e.to_string())
}

/// Read the class index from the first model output.
///
/// Tree-ensemble exports emit an `i64` label tensor; plain score outputs are
/// reduced by arg-max, or thresholded at 0.5 for a single probability.
fn class_from_output(output: &Tensor) -> Result<usize, InferenceError> {
    if output.datum_type() == i64::datum_type() {
        let labels = output.as_slice::<i64>().map_err(failed)?;
        let label = *labels
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("Empty label output".to_string()))?;
        return usize::try_from(label)
            .map_err(|_| InferenceError::InferenceFailed(format!("Negative class index {}", label)));
    }

    let scores = output.cast_to::<f32>().map_err(failed)?;
    let scores = scores.as_slice::<f32>().map_err(failed)?;
    match scores {
        [] => Err(InferenceError::InferenceFailed("Empty score output".to_string())),
        [probability] => Ok(usize::from(*probability >= 0.5)),
        _ => Ok(scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_output() {
        let output = Tensor::from_shape(&[1], &[1i64]).unwrap();
        assert_eq!(class_from_output(&output).unwrap(), 1);

        let negative = Tensor::from_shape(&[1], &[-1i64]).unwrap();
        assert!(class_from_output(&negative).is_err());
    }

    #[test]
    fn test_score_outputs() {
        let probs = Tensor::from_shape(&[1, 3], &[0.1f32, 0.7, 0.2]).unwrap();
        assert_eq!(class_from_output(&probs).unwrap(), 1);

        let single = Tensor::from_shape(&[1, 1], &[0.3f32]).unwrap();
        assert_eq!(class_from_output(&single).unwrap(), 0);
    }

    #[test]
    fn test_missing_model_file() {
        let result = OnnxClassifier::load("/nonexistent/itn_model.onnx");
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }
}
