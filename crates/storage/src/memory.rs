//! In-Memory Run Store

use crate::run::{PredictionRun, RunId};
use crate::{PersistenceError, RunStore};
use std::sync::Mutex;
use tracing::{debug, info};

/// Run history held in process memory
///
/// Same append-only contract as the file store; contents are lost when the
/// store is dropped.
pub struct MemoryRunStore {
    /// Runs kept sorted by id
    runs: Mutex<Vec<PredictionRun>>,
}

impl MemoryRunStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Creating in-memory run store");
        Self {
            runs: Mutex::new(Vec::new()),
        }
    }

    /// Number of stored runs
    pub fn len(&self) -> usize {
        self.runs.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether no run has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStore for MemoryRunStore {
    fn append(&self, run: PredictionRun) -> Result<RunId, PersistenceError> {
        let mut runs = self
            .runs
            .lock()
            .map_err(|e| PersistenceError::Unavailable(format!("Lock error: {}", e)))?;

        let mut id = run.id();
        let position = loop {
            match runs.binary_search_by(|r| r.id().cmp(&id)) {
                Ok(_) => {
                    id = id
                        .next()
                        .ok_or_else(|| PersistenceError::SequenceExhausted(id.to_string()))?;
                }
                Err(position) => break position,
            }
        };

        runs.insert(position, run.rekeyed(id));
        debug!("Stored prediction run {}", id);
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<PredictionRun>, PersistenceError> {
        let runs = self
            .runs
            .lock()
            .map_err(|e| PersistenceError::Unavailable(format!("Lock error: {}", e)))?;
        Ok(runs.clone())
    }
}
