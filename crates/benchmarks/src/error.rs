use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BenchmarkError {
    #[error("Benchmark aggregation failed for group '{group}': {reason}")]
    AggregationFailure { group: String, reason: String },

    #[error("KPI '{0}' cannot be benchmarked")]
    UnknownMetric(String),

    #[error("Minimum population must be at least 2 accounts, got {0}")]
    InvalidMinimumPopulation(usize),
}
