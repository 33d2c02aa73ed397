//! Prediction Run Records

use crate::PersistenceError;
use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use feature_engine::{Column, Dataset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column holding the decoded usage label of each row
pub const PREDICTED_LABEL_COLUMN: &str = "predicted_label";

/// Column holding the raw class index of each row
pub const PREDICTED_CLASS_COLUMN: &str = "predicted";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const TIMESTAMP_LEN: usize = 19;
const MAX_SEQUENCE: u32 = 9999;

/// Identity of a prediction run: its second-resolution UTC timestamp plus a
/// sequence number separating runs recorded within the same second.
///
/// Renders as `2024-05-01_14-03-22` or `2024-05-01_14-03-22_0001`; the
/// rendered form sorts lexicographically in the same order as `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RunId {
    recorded_at: NaiveDateTime,
    sequence: u32,
}

impl RunId {
    /// Id for a run recorded at the given instant
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at: recorded_at.naive_utc().trunc_subsecs(0),
            sequence: 0,
        }
    }

    /// Recording time, truncated to the second
    pub fn recorded_at(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.recorded_at)
    }

    /// Collision sequence, zero for the first run of a second
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Next free candidate within the same second
    pub fn next(self) -> Option<Self> {
        (self.sequence < MAX_SEQUENCE).then(|| Self {
            sequence: self.sequence + 1,
            ..self
        })
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.recorded_at.format(TIMESTAMP_FORMAT))?;
        if self.sequence > 0 {
            write!(f, "_{:04}", self.sequence)?;
        }
        Ok(())
    }
}

impl FromStr for RunId {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PersistenceError::InvalidRunId(s.to_string());

        let (timestamp, suffix) = match s.get(..TIMESTAMP_LEN) {
            Some(timestamp) => (timestamp, &s[TIMESTAMP_LEN..]),
            None => return Err(invalid()),
        };
        let recorded_at =
            NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).map_err(|_| invalid())?;

        let sequence = match suffix {
            "" => 0,
            _ => {
                let digits = suffix.strip_prefix('_').ok_or_else(invalid)?;
                if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let sequence: u32 = digits.parse().map_err(|_| invalid())?;
                if sequence == 0 {
                    return Err(invalid());
                }
                sequence
            }
        };

        Ok(Self {
            recorded_at,
            sequence,
        })
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RunId {
    type Error = PersistenceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One batch prediction: the labeled dataset and the id it is recorded under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRun {
    id: RunId,
    dataset: Dataset,
}

impl PredictionRun {
    /// New run recorded at the given instant
    pub fn new(recorded_at: DateTime<Utc>, dataset: Dataset) -> Self {
        Self::from_parts(RunId::new(recorded_at), dataset)
    }

    /// Reassemble a run from a known id
    pub fn from_parts(id: RunId, dataset: Dataset) -> Self {
        Self { id, dataset }
    }

    /// Run identity
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Labeled dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of labeled rows
    pub fn row_count(&self) -> usize {
        self.dataset.row_count()
    }

    /// The `predicted_label` column, if present
    pub fn labels(&self) -> Option<&Column> {
        self.dataset.column(PREDICTED_LABEL_COLUMN)
    }

    /// Give up the dataset
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    pub(crate) fn rekeyed(self, id: RunId) -> Self {
        Self { id, ..self }
    }
}
