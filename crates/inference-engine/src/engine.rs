//! Inference Engine Implementation

use crate::classifier::Classifier;
use crate::decoder::LabelDecoder;
use crate::InferenceError;
use feature_engine::{EncodedFeatureRow, EncodedFeatureTable, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Labels for a whole feature table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPrediction {
    /// Raw class index per row
    pub class_indices: Vec<usize>,
    /// Decoded label per row
    pub labels: Vec<String>,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

/// Usage classifier paired with its label decoder
///
/// Both artifacts are injected at construction and never mutated.
pub struct InferenceEngine {
    classifier: Box<dyn Classifier>,
    decoder: LabelDecoder,
}

impl InferenceEngine {
    /// Create a new inference engine
    pub fn new(classifier: Box<dyn Classifier>, decoder: LabelDecoder) -> Self {
        info!(
            "Creating inference engine with {} output classes",
            decoder.len()
        );
        Self {
            classifier,
            decoder,
        }
    }

    /// Predict the class index of one encoded row
    pub fn predict(&self, row: &EncodedFeatureRow) -> Result<usize, InferenceError> {
        let predictions = self.classifier.predict(std::slice::from_ref(row))?;
        match predictions.as_slice() {
            [index] => Ok(*index),
            other => Err(InferenceError::InferenceFailed(format!(
                "Classifier returned {} predictions for 1 row",
                other.len()
            ))),
        }
    }

    /// Predict from loose slot values, checking arity first
    pub fn predict_values(&self, values: &[u32]) -> Result<usize, InferenceError> {
        let row = EncodedFeatureRow::from_slice(values).ok_or_else(|| {
            InferenceError::InvalidInputShape {
                expected: format!("[{}]", FEATURE_DIMENSION),
                actual: format!("[{}]", values.len()),
            }
        })?;
        self.predict(&row)
    }

    /// Predict one class index per table row
    pub fn predict_batch(&self, table: &EncodedFeatureTable) -> Result<Vec<usize>, InferenceError> {
        if table.is_empty() {
            return Ok(Vec::new());
        }

        let predictions = self.classifier.predict(table.rows())?;
        if predictions.len() != table.len() {
            return Err(InferenceError::InferenceFailed(format!(
                "Classifier returned {} predictions for {} rows",
                predictions.len(),
                table.len()
            )));
        }
        Ok(predictions)
    }

    /// Label of a class index
    pub fn decode(&self, index: usize) -> Result<&str, InferenceError> {
        self.decoder.decode(index)
    }

    /// Predict and decode every row; any failure fails the whole batch
    pub fn label_batch(&self, table: &EncodedFeatureTable) -> Result<BatchPrediction, InferenceError> {
        let start = std::time::Instant::now();

        let class_indices = self.predict_batch(table)?;
        let labels = class_indices
            .iter()
            .map(|&index| self.decode(index).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!("Labeled {} rows in {}ms", labels.len(), latency_ms);

        Ok(BatchPrediction {
            class_indices,
            labels,
            latency_ms,
        })
    }

    /// Label decoder in use
    pub fn decoder(&self) -> &LabelDecoder {
        &self.decoder
    }
}
