//! Trend Aggregation over Recorded Runs

use feature_engine::Value;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use storage::{PredictionRun, RunId, PREDICTED_LABEL_COLUMN};
use tracing::{debug, warn};

/// Label distribution of one recorded run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Run the distribution was computed from
    pub run_id: RunId,
    /// Share of rows per label, every series label present
    pub proportions: BTreeMap<String, f64>,
}

impl TrendPoint {
    /// Share of a label in this run, 0.0 for unknown labels
    pub fn proportion(&self, label: &str) -> f64 {
        self.proportions.get(label).copied().unwrap_or(0.0)
    }
}

/// Dense, zero-filled label proportions over time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    labels: Vec<String>,
    points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Union of labels across all runs, sorted
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// One point per run, in run order
    pub fn points(&self) -> &[TrendPoint] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One label's share over time
    pub fn series_for(&self, label: &str) -> Vec<(RunId, f64)> {
        self.points
            .iter()
            .map(|p| (p.run_id, p.proportion(label)))
            .collect()
    }
}

/// Computes usage trends from prediction history
pub struct TrendAggregator;

impl TrendAggregator {
    /// Aggregate runs into a trend series.
    ///
    /// Proportions divide label counts by the run's row count. Labels missing
    /// from a run are reported as 0.0 and a run without rows yields all zeros.
    /// Runs with no `predicted_label` column are skipped.
    pub fn compute(runs: &[PredictionRun]) -> TrendSeries {
        let mut ordered: Vec<&PredictionRun> = runs.iter().collect();
        ordered.sort_by_key(|run| run.id());

        let mut labels = BTreeSet::new();
        let mut counted = Vec::with_capacity(ordered.len());

        for run in ordered {
            let column = match run.labels() {
                Some(column) => column,
                None => {
                    warn!(
                        "Run {} has no '{}' column, skipping",
                        run.id(),
                        PREDICTED_LABEL_COLUMN
                    );
                    continue;
                }
            };

            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for label in column.values.iter().filter_map(Value::category_label) {
                *counts.entry(label).or_default() += 1;
            }
            labels.extend(counts.keys().cloned());
            counted.push((run.id(), run.row_count(), counts));
        }

        let points: Vec<TrendPoint> = counted
            .into_iter()
            .map(|(run_id, total, counts)| {
                let proportions = labels
                    .iter()
                    .map(|label| {
                        let count = counts.get(label).copied().unwrap_or(0);
                        let share = if total == 0 {
                            0.0
                        } else {
                            count as f64 / total as f64
                        };
                        (label.clone(), share)
                    })
                    .collect();
                TrendPoint {
                    run_id,
                    proportions,
                }
            })
            .collect();

        debug!(
            "Computed trend over {} runs and {} labels",
            points.len(),
            labels.len()
        );

        TrendSeries {
            labels: labels.into_iter().collect(),
            points,
        }
    }
}
