//! Categorical Value Encoding

use crate::dataset::Value;
use crate::vocabulary::CategoryVocabulary;
use std::cmp::Ordering;

/// Converts a column of raw categorical values into integer codes
///
/// Equal values always receive equal codes and distinct values distinct codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoricalEncoder {
    /// Fit on each call: distinct values are sorted (numbers ascending, then
    /// text lexicographically) and numbered from zero. Missing values take the
    /// code after the last category.
    #[default]
    Refit,
    /// Apply a fixed training-time table; missing and unseen values take the
    /// vocabulary's unseen code.
    Vocabulary(CategoryVocabulary),
}

impl CategoricalEncoder {
    /// Encoder that refits per call
    pub fn refit() -> Self {
        CategoricalEncoder::Refit
    }

    /// Encoder bound to a training-time vocabulary
    pub fn with_vocabulary(vocabulary: CategoryVocabulary) -> Self {
        CategoricalEncoder::Vocabulary(vocabulary)
    }

    /// Whether this encoder refits per call
    pub fn is_refit(&self) -> bool {
        matches!(self, CategoricalEncoder::Refit)
    }

    /// Encode a column, one code per value
    pub fn encode(&self, values: &[Value]) -> Vec<u32> {
        match self {
            CategoricalEncoder::Refit => refit_encode(values),
            CategoricalEncoder::Vocabulary(vocabulary) => {
                values.iter().map(|v| vocabulary.code(v)).collect()
            }
        }
    }
}

/// Sort key for refit encoding
#[derive(Debug, Clone, Copy)]
enum Category<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> Category<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) if n.is_nan() => None,
            // fold -0.0 into 0.0
            Value::Number(n) => Some(Category::Number(*n + 0.0)),
            Value::Text(s) => Some(Category::Text(s)),
        }
    }
}

impl Ord for Category<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Category::Number(a), Category::Number(b)) => a.total_cmp(b),
            (Category::Number(_), Category::Text(_)) => Ordering::Less,
            (Category::Text(_), Category::Number(_)) => Ordering::Greater,
            (Category::Text(a), Category::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Category<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Category<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Category<'_> {}

fn refit_encode(values: &[Value]) -> Vec<u32> {
    let mut categories: Vec<Category<'_>> = values.iter().filter_map(Category::of).collect();
    categories.sort_unstable();
    categories.dedup();

    let missing = categories.len() as u32;
    values
        .iter()
        .map(|value| {
            Category::of(value)
                .and_then(|c| categories.binary_search(&c).ok())
                .map_or(missing, |code| code as u32)
        })
        .collect()
}
