//! Column-to-Slot Feature Mapping

use crate::dataset::Dataset;
use crate::encoder::CategoricalEncoder;
use crate::error::SchemaBindingError;
use crate::schema::{ColumnBinding, FeatureSlot, FEATURE_DIMENSION};
use crate::vocabulary::EncodingVocabulary;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One encoded survey record, slot values in schema order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EncodedFeatureRow(pub [u32; FEATURE_DIMENSION]);

impl EncodedFeatureRow {
    /// Build a row from a slice, `None` unless it has exactly one value per slot
    pub fn from_slice(values: &[u32]) -> Option<Self> {
        <[u32; FEATURE_DIMENSION]>::try_from(values).ok().map(Self)
    }

    /// Code for a slot
    pub fn get(&self, slot: FeatureSlot) -> u32 {
        self.0[slot.index()]
    }

    /// Raw slot values
    pub fn values(&self) -> &[u32; FEATURE_DIMENSION] {
        &self.0
    }
}

impl From<[u32; FEATURE_DIMENSION]> for EncodedFeatureRow {
    fn from(values: [u32; FEATURE_DIMENSION]) -> Self {
        Self(values)
    }
}

/// Encoded feature rows, aligned with the rows of the source dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedFeatureTable {
    rows: Vec<EncodedFeatureRow>,
}

impl EncodedFeatureTable {
    /// Wrap pre-encoded rows
    pub fn from_rows(rows: Vec<EncodedFeatureRow>) -> Self {
        Self { rows }
    }

    /// All rows
    pub fn rows(&self) -> &[EncodedFeatureRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Codes of one slot across all rows
    pub fn column(&self, slot: FeatureSlot) -> Vec<u32> {
        self.rows.iter().map(|row| row.get(slot)).collect()
    }
}

/// Binds dataset columns to feature slots and encodes them
#[derive(Debug, Clone, Default)]
pub struct FeatureMapper {
    encoders: [CategoricalEncoder; FEATURE_DIMENSION],
}

impl FeatureMapper {
    /// Mapper that refits every slot's encoder per dataset
    pub fn refit() -> Self {
        Self::default()
    }

    /// Mapper applying the training-time vocabulary of every slot
    pub fn with_vocabulary(vocabulary: EncodingVocabulary) -> Self {
        Self {
            encoders: vocabulary.into_slots().map(CategoricalEncoder::with_vocabulary),
        }
    }

    /// Encoder used for a slot
    pub fn encoder(&self, slot: FeatureSlot) -> &CategoricalEncoder {
        &self.encoders[slot.index()]
    }

    /// Encode the bound columns of `dataset` into a feature table.
    ///
    /// Every slot must be bound to a non-empty column. Duplicate column names
    /// resolve to their first occurrence.
    pub fn map(
        &self,
        dataset: &Dataset,
        binding: &ColumnBinding,
    ) -> Result<EncodedFeatureTable, SchemaBindingError> {
        let mut columns = Vec::with_capacity(FEATURE_DIMENSION);
        for slot in FeatureSlot::ALL {
            let name = binding
                .get(slot)
                .ok_or(SchemaBindingError::UnboundSlot(slot))?;
            let column = dataset
                .column(name)
                .ok_or_else(|| SchemaBindingError::MissingColumn {
                    slot,
                    column: name.to_string(),
                })?;
            if column.is_empty() {
                return Err(SchemaBindingError::EmptyColumn {
                    slot,
                    column: name.to_string(),
                });
            }
            columns.push(column);
        }

        let mut codes: [Vec<u32>; FEATURE_DIMENSION] = Default::default();
        for (slot, column) in FeatureSlot::ALL.into_iter().zip(columns) {
            codes[slot.index()] = self.encoder(slot).encode(&column.values);
            debug!(
                "Encoded slot {} from column '{}' ({} rows)",
                slot,
                column.name,
                column.len()
            );
        }

        let rows = (0..dataset.row_count())
            .map(|r| EncodedFeatureRow([codes[0][r], codes[1][r], codes[2][r], codes[3][r]]))
            .collect();

        Ok(EncodedFeatureTable { rows })
    }
}
