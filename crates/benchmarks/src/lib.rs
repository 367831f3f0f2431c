//! # Industry Benchmarks
//!
//! Computes percentile benchmarks for KPIs across the population of connected
//! accounts, grouped by industry and optional refinement dimensions.
//!
//! ## Public API
//!
//! - `BenchmarkAggregator`: groups accounts and computes a `BenchmarkTable`.
//! - `PercentileBand` / `BenchmarkOutcome`: a p25/p50/p75 band, or an explicit
//!   insufficient-data marker for groups below the minimum population.
//! - `DimensionSet` / `GroupKey`: how accounts are grouped.
//! - `fallback`: the static dataset served when live benchmarks are unavailable.

pub mod aggregator;
pub mod band;
pub mod error;
pub mod fallback;
pub mod grouping;
pub mod percentile;

pub use aggregator::{BenchmarkAggregator, BenchmarkTable, GroupBenchmarks};
pub use band::{BenchmarkOutcome, PercentileBand};
pub use error::BenchmarkError;
pub use fallback::{fallback_for, FallbackBenchmark, MetricRange, FALLBACK_CURRENCY};
pub use grouping::{DimensionSet, GroupKey};
pub use percentile::{percentile_sorted, quartiles};
