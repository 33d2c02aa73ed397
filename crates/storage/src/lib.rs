//! Storage Layer
//!
//! Append-only history of prediction runs. Each run is an immutable labeled
//! dataset keyed by its timestamp; runs are never edited or deleted.

mod fs_store;
mod memory;
mod run;

pub use fs_store::FileRunStore;
pub use memory::MemoryRunStore;
pub use run::{PredictionRun, RunId, PREDICTED_CLASS_COLUMN, PREDICTED_LABEL_COLUMN};

use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Corrupt run record {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("Invalid run id: {0}")]
    InvalidRunId(String),
    #[error("No free run id left for timestamp {0}")]
    SequenceExhausted(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of prediction runs
pub trait RunStore {
    /// Durably record a run.
    ///
    /// Returns the id the run was stored under, which carries a sequence
    /// suffix when the run's timestamp was already taken. A failed append
    /// leaves previously stored runs untouched.
    fn append(&self, run: PredictionRun) -> Result<RunId, PersistenceError>;

    /// All stored runs in ascending id order
    fn list_all(&self) -> Result<Vec<PredictionRun>, PersistenceError>;
}

impl<S: RunStore + ?Sized> RunStore for &S {
    fn append(&self, run: PredictionRun) -> Result<RunId, PersistenceError> {
        (**self).append(run)
    }

    fn list_all(&self) -> Result<Vec<PredictionRun>, PersistenceError> {
        (**self).list_all()
    }
}

impl<S: RunStore + ?Sized> RunStore for Box<S> {
    fn append(&self, run: PredictionRun) -> Result<RunId, PersistenceError> {
        (**self).append(run)
    }

    fn list_all(&self) -> Result<Vec<PredictionRun>, PersistenceError> {
        (**self).list_all()
    }
}
