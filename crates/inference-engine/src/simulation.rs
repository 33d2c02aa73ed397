//! What-If Simulation

use crate::engine::InferenceEngine;
use crate::InferenceError;
use feature_engine::{EncodedFeatureRow, FEATURE_DIMENSION};
use tracing::debug;

/// Predicts the label of a single hand-specified feature row
///
/// Borrows the engine and touches no prediction history.
pub struct SimulationRunner<'a> {
    engine: &'a InferenceEngine,
}

impl<'a> SimulationRunner<'a> {
    /// Create a runner over an engine
    pub fn new(engine: &'a InferenceEngine) -> Self {
        Self { engine }
    }

    /// Label for already-encoded slot values
    pub fn simulate(&self, slot_values: [u32; FEATURE_DIMENSION]) -> Result<String, InferenceError> {
        let index = self.engine.predict(&EncodedFeatureRow(slot_values))?;
        let label = self.engine.decode(index)?;
        debug!("Simulated {:?} -> {}", slot_values, label);
        Ok(label.to_string())
    }

    /// Label for loose slot values, checking arity first
    pub fn simulate_values(&self, slot_values: &[u32]) -> Result<String, InferenceError> {
        let index = self.engine.predict_values(slot_values)?;
        self.engine.decode(index).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{engine, AttitudeRule};

    #[test]
    fn test_simulation_is_repeatable() {
        let engine = engine(AttitudeRule);
        let runner = SimulationRunner::new(&engine);

        let first = runner.simulate([2, 1, 0, 2]).unwrap();
        let second = runner.simulate([2, 1, 0, 2]).unwrap();
        assert_eq!(first, "Uses ITN");
        assert_eq!(first, second);
        assert_eq!(runner.simulate([2, 1, 0, 0]).unwrap(), "Does not use ITN");
    }

    #[test]
    fn test_simulation_arity() {
        let engine = engine(AttitudeRule);
        let runner = SimulationRunner::new(&engine);

        assert!(matches!(
            runner.simulate_values(&[0, 0]),
            Err(InferenceError::InvalidInputShape { .. })
        ));
        assert_eq!(runner.simulate_values(&[0, 0, 1, 1]).unwrap(), "Uses ITN");
    }
}
