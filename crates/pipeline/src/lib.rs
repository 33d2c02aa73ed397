//! ITN Usage Prediction Pipeline
//!
//! Wires column mapping, inference, run history and trend aggregation into a
//! single synchronous prediction flow.

mod config;
mod pipeline;

pub use crate::config::PipelineConfig;
pub use crate::pipeline::{
    load_engine, parse_simulation_codes, HistoryStatus, PipelineOutcome, PredictionPipeline,
};

use feature_engine::{DatasetError, SchemaBindingError, VocabularyError};
use inference_engine::InferenceError;
use storage::PersistenceError;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Errors surfaced by a pipeline invocation
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    SchemaBinding(#[from] SchemaBindingError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Invalid simulation input: {0}")]
    InvalidSimulation(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

/// Initialize logging to stderr
pub fn init_logging(level: Level) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
