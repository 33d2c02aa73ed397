//! Feature Engine Error Types

use crate::schema::FeatureSlot;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while binding dataset columns to feature slots
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaBindingError {
    /// A required slot has no column assigned
    #[error("Feature slot '{0}' is not bound to a dataset column")]
    UnboundSlot(FeatureSlot),

    /// The bound column is not present in the dataset
    #[error("Column '{column}' bound to slot '{slot}' does not exist in the dataset")]
    MissingColumn { slot: FeatureSlot, column: String },

    /// The bound column holds no values
    #[error("Column '{column}' bound to slot '{slot}' has no rows")]
    EmptyColumn { slot: FeatureSlot, column: String },
}

/// Errors while assembling a dataset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// Column length disagrees with the dataset row count
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Requested column is not in the dataset
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// Errors while loading a training-time encoding vocabulary
#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Failed to read vocabulary {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid vocabulary format: {0}")]
    Parse(String),

    #[error("Vocabulary has no categories for slot '{0}'")]
    MissingSlot(FeatureSlot),

    #[error("Vocabulary names unknown slot '{0}'")]
    UnknownSlot(String),

    #[error("Category '{0}' appears more than once")]
    DuplicateCategory(String),

    /// The unseen code would shadow a real category
    #[error("Unseen code {code} collides with one of {categories} category codes")]
    UnseenCodeCollision { code: u32, categories: usize },
}
