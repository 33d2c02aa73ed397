//! Feature Schema and Column Binding

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Number of feature slots the classifier consumes
pub const FEATURE_DIMENSION: usize = 4;

/// Semantic input slot of the ITN usage classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSlot {
    /// Highest level of education reached
    EducationalLevel,
    /// Respondent age bracket
    AgeCategory,
    /// Urban or rural residence
    ResidenceArea,
    /// Attitude toward sleeping under an ITN every night
    ItnAttitude,
}

impl FeatureSlot {
    /// All slots in the order the model consumes them
    pub const ALL: [FeatureSlot; FEATURE_DIMENSION] = [
        FeatureSlot::EducationalLevel,
        FeatureSlot::AgeCategory,
        FeatureSlot::ResidenceArea,
        FeatureSlot::ItnAttitude,
    ];

    /// Position in the encoded feature row
    pub fn index(self) -> usize {
        match self {
            FeatureSlot::EducationalLevel => 0,
            FeatureSlot::AgeCategory => 1,
            FeatureSlot::ResidenceArea => 2,
            FeatureSlot::ItnAttitude => 3,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSlot::EducationalLevel => "educational_level",
            FeatureSlot::AgeCategory => "age_category",
            FeatureSlot::ResidenceArea => "residence_area",
            FeatureSlot::ItnAttitude => "itn_attitude",
        }
    }

    /// Name of the encoded column the model was trained on
    pub fn encoded_column(&self) -> &'static str {
        match self {
            FeatureSlot::EducationalLevel => "educational_level_encoded",
            FeatureSlot::AgeCategory => "age_category_encoded",
            FeatureSlot::ResidenceArea => "do_you_live_in_an_urban_or_rural_area?_encoded",
            FeatureSlot::ItnAttitude => "how_do_you_feel_about_using_an_itn_every_night?_encoded",
        }
    }

    /// Human-readable name for column pickers
    pub fn description(&self) -> &'static str {
        match self {
            FeatureSlot::EducationalLevel => "Educational Level",
            FeatureSlot::AgeCategory => "Age Category",
            FeatureSlot::ResidenceArea => "Residence (Urban/Rural)",
            FeatureSlot::ItnAttitude => "Attitude Toward ITN",
        }
    }

    /// Codes offered for what-if simulation
    pub fn simulation_codes(&self) -> RangeInclusive<u32> {
        match self {
            FeatureSlot::EducationalLevel => 0..=3,
            FeatureSlot::AgeCategory => 0..=2,
            FeatureSlot::ResidenceArea => 0..=1,
            FeatureSlot::ItnAttitude => 0..=2,
        }
    }

    /// Parse from the snake_case slot name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == name)
    }
}

impl fmt::Display for FeatureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment of dataset column names to feature slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBinding {
    columns: [Option<String>; FEATURE_DIMENSION],
}

impl ColumnBinding {
    /// Create an empty binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a slot, builder style
    pub fn bind(mut self, slot: FeatureSlot, column: impl Into<String>) -> Self {
        self.set(slot, column);
        self
    }

    /// Bind or rebind a slot
    pub fn set(&mut self, slot: FeatureSlot, column: impl Into<String>) {
        self.columns[slot.index()] = Some(column.into());
    }

    /// Remove a slot's binding
    pub fn unset(&mut self, slot: FeatureSlot) {
        self.columns[slot.index()] = None;
    }

    /// Column bound to a slot
    pub fn get(&self, slot: FeatureSlot) -> Option<&str> {
        self.columns[slot.index()].as_deref()
    }

    /// Whether every slot is bound
    pub fn is_total(&self) -> bool {
        self.columns.iter().all(Option::is_some)
    }

    /// Slots still lacking a column, in schema order
    pub fn unbound_slots(&self) -> Vec<FeatureSlot> {
        FeatureSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_order_matches_index() {
        for (i, slot) in FeatureSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert_eq!(FeatureSlot::from_name(slot.as_str()), Some(*slot));
        }
    }

    #[test]
    fn test_binding_totality() {
        let binding = ColumnBinding::new()
            .bind(FeatureSlot::EducationalLevel, "edu")
            .bind(FeatureSlot::AgeCategory, "age")
            .bind(FeatureSlot::ResidenceArea, "area");

        assert!(!binding.is_total());
        assert_eq!(binding.unbound_slots(), vec![FeatureSlot::ItnAttitude]);

        let binding = binding.bind(FeatureSlot::ItnAttitude, "attitude");
        assert!(binding.is_total());
        assert_eq!(binding.get(FeatureSlot::ResidenceArea), Some("area"));
    }
}
