//! # Performance Analyzer
//!
//! Judges actual KPI values against industry percentile bands and turns the
//! verdicts into human-readable insights. Pure computation: benchmarks and
//! KPI values are supplied by the caller.

pub mod classifier;
pub mod insights;

pub use classifier::{Classification, ClassifiedMetric, PerformanceClassifier};
pub use insights::{
    in_line_insight, mean_performance, neutral_insight, summarize_industries, Insight, InsightGenerator,
    InsightKind, InsightPriority,
};
