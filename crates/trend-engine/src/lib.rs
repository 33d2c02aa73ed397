//! Usage Trend Engine
//!
//! Derives per-label proportion time series from recorded prediction runs and
//! segments a single labeled dataset by predicted usage.

mod aggregator;
mod segmentation;

pub use aggregator::{TrendAggregator, TrendPoint, TrendSeries};
pub use segmentation::{segment, LabelSegment};
