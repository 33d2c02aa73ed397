//! Risk Segmentation by Predicted Usage

use feature_engine::{Dataset, Value};
use serde::Serialize;
use std::collections::HashMap;
use storage::PREDICTED_LABEL_COLUMN;

/// Rows sharing one predicted label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSegment {
    pub label: String,
    pub count: usize,
    /// Share of all rows in the dataset
    pub share: f64,
}

/// Group a labeled dataset by predicted label, largest segment first.
///
/// Returns nothing when the dataset carries no `predicted_label` column.
pub fn segment(dataset: &Dataset) -> Vec<LabelSegment> {
    let column = match dataset.column(PREDICTED_LABEL_COLUMN) {
        Some(column) => column,
        None => return Vec::new(),
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in column.values.iter().filter_map(Value::category_label) {
        *counts.entry(label).or_default() += 1;
    }

    let total = dataset.row_count().max(1) as f64;
    let mut segments: Vec<LabelSegment> = counts
        .into_iter()
        .map(|(label, count)| LabelSegment {
            label,
            count,
            share: count as f64 / total,
        })
        .collect();
    segments.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    segments
}
