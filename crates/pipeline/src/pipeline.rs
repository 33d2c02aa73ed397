//! Prediction Pipeline Orchestration

use crate::config::PipelineConfig;
use crate::PipelineError;
use chrono::{DateTime, Utc};
use feature_engine::{
    Column, ColumnBinding, Dataset, EncodingVocabulary, FeatureMapper, FeatureSlot,
    FEATURE_DIMENSION,
};
use inference_engine::{
    BatchPrediction, InferenceEngine, LabelDecoder, OnnxClassifier, SimulationRunner,
};
use storage::{
    FileRunStore, PersistenceError, PredictionRun, RunId, RunStore, PREDICTED_CLASS_COLUMN,
    PREDICTED_LABEL_COLUMN,
};
use tracing::{error, info, warn};
use trend_engine::{segment, LabelSegment, TrendAggregator, TrendSeries};

/// Whether a labeled dataset made it into the run history
#[derive(Debug)]
pub enum HistoryStatus {
    /// Durably stored under this id
    Recorded(RunId),
    /// The append failed; the run is absent from history and trends
    NotRecorded(PersistenceError),
}

/// Result of one pipeline invocation
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Input dataset extended with encoded, `predicted` and `predicted_label` columns
    pub labeled: Dataset,
    /// Raw predictions behind the label column
    pub prediction: BatchPrediction,
    /// History status of this run
    pub history: HistoryStatus,
}

impl PipelineOutcome {
    /// Whether the run was stored
    pub fn is_recorded(&self) -> bool {
        matches!(self.history, HistoryStatus::Recorded(_))
    }

    /// Id the run was stored under
    pub fn run_id(&self) -> Option<RunId> {
        match self.history {
            HistoryStatus::Recorded(id) => Some(id),
            HistoryStatus::NotRecorded(_) => None,
        }
    }

    /// Risk segmentation of this run's labels
    pub fn segments(&self) -> Vec<LabelSegment> {
        segment(&self.labeled)
    }

    /// Treat an unrecorded run as a failed run
    pub fn into_recorded(self) -> Result<(RunId, Dataset), PipelineError> {
        match self.history {
            HistoryStatus::Recorded(id) => Ok((id, self.labeled)),
            HistoryStatus::NotRecorded(e) => Err(e.into()),
        }
    }
}

/// Column mapping, inference and run history over one run store
pub struct PredictionPipeline<S> {
    mapper: FeatureMapper,
    engine: InferenceEngine,
    store: S,
}

impl<S: RunStore> PredictionPipeline<S> {
    /// Assemble a pipeline from its parts
    pub fn new(mapper: FeatureMapper, engine: InferenceEngine, store: S) -> Self {
        Self {
            mapper,
            engine,
            store,
        }
    }

    /// Label a dataset and record it, timestamped now
    pub fn run(
        &self,
        dataset: Dataset,
        binding: &ColumnBinding,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.run_at(dataset, binding, Utc::now())
    }

    /// Label a dataset and record it under the given timestamp.
    ///
    /// Mapping and inference failures abort before anything is recorded. A
    /// failed append still returns the labeled dataset, marked
    /// [`HistoryStatus::NotRecorded`].
    pub fn run_at(
        &self,
        mut dataset: Dataset,
        binding: &ColumnBinding,
        recorded_at: DateTime<Utc>,
    ) -> Result<PipelineOutcome, PipelineError> {
        dataset.dedup_columns();

        let table = self.mapper.map(&dataset, binding)?;
        let prediction = self.engine.label_batch(&table)?;

        for slot in FeatureSlot::ALL {
            dataset.set_column(Column::new(slot.encoded_column(), table.column(slot)))?;
        }
        dataset.set_column(Column::new(
            PREDICTED_CLASS_COLUMN,
            prediction.class_indices.iter().map(|&index| index as f64),
        ))?;
        dataset.set_column(Column::new(
            PREDICTED_LABEL_COLUMN,
            prediction.labels.iter().cloned(),
        ))?;

        info!(
            "Labeled {} rows in {}ms",
            dataset.row_count(),
            prediction.latency_ms
        );

        let history = match self
            .store
            .append(PredictionRun::new(recorded_at, dataset.clone()))
        {
            Ok(id) => HistoryStatus::Recorded(id),
            Err(e) => {
                error!("Prediction run not recorded in history: {}", e);
                HistoryStatus::NotRecorded(e)
            }
        };

        Ok(PipelineOutcome {
            labeled: dataset,
            prediction,
            history,
        })
    }

    /// Usage trend over every recorded run
    pub fn trends(&self) -> Result<TrendSeries, PersistenceError> {
        let runs = self.store.list_all()?;
        Ok(TrendAggregator::compute(&runs))
    }

    /// What-if simulation over this pipeline's engine
    pub fn simulator(&self) -> SimulationRunner<'_> {
        SimulationRunner::new(&self.engine)
    }

    /// Column mapper in use
    pub fn mapper(&self) -> &FeatureMapper {
        &self.mapper
    }

    /// Inference engine in use
    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Run store in use
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl PredictionPipeline<FileRunStore> {
    /// Load artifacts and open the history directory named by `config`
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let engine = load_engine(config)?;

        let mapper = match &config.vocabulary_path {
            Some(path) => {
                FeatureMapper::with_vocabulary(EncodingVocabulary::from_json_file(path)?)
            }
            None => {
                warn!("No encoding vocabulary configured, refitting encoders per dataset");
                FeatureMapper::refit()
            }
        };

        let store = FileRunStore::open(&config.history_dir)?;
        Ok(Self::new(mapper, engine, store))
    }
}

/// Load the classifier and label decoder named by `config`.
///
/// Touches nothing but the two artifacts, so what-if simulation can run
/// without a history directory.
pub fn load_engine(config: &PipelineConfig) -> Result<InferenceEngine, PipelineError> {
    let classifier = OnnxClassifier::load(&config.model_path)?;
    let decoder = LabelDecoder::from_json_file(&config.decoder_path)?;
    Ok(InferenceEngine::new(Box::new(classifier), decoder))
}

/// Parse what-if slot codes, one argument per slot in slot order.
///
/// Each code must lie in the slot's offered simulation range.
pub fn parse_simulation_codes(
    args: &[String],
) -> Result<[u32; FEATURE_DIMENSION], PipelineError> {
    if args.len() != FEATURE_DIMENSION {
        return Err(PipelineError::InvalidSimulation(format!(
            "expected {} codes, got {}",
            FEATURE_DIMENSION,
            args.len()
        )));
    }

    let mut codes = [0u32; FEATURE_DIMENSION];
    for (slot, arg) in FeatureSlot::ALL.into_iter().zip(args) {
        let range = slot.simulation_codes();
        let code = arg
            .parse::<u32>()
            .ok()
            .filter(|code| range.contains(code))
            .ok_or_else(|| {
                PipelineError::InvalidSimulation(format!(
                    "{} must be a code in {}..={}, got '{}'",
                    slot.description(),
                    range.start(),
                    range.end(),
                    arg
                ))
            })?;
        codes[slot.index()] = code;
    }
    Ok(codes)
}
