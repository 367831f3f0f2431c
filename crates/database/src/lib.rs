//! # Database Crate
//!
//! The PostgreSQL adapter for the benchmark engine. It owns the schema
//! (embedded migrations) and turns raw rows into the `core-types` structures
//! the engine consumes: metric aggregates, account profiles, and the
//! exchange-rate snapshot.
//!
//! Metric queries are assembled at runtime with `sqlx::QueryBuilder` because
//! the grouping keys and filters vary per request. Every value is bound, never
//! interpolated.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool setup and schema upgrades.
//! - `DbRepository`: the data access methods.
//! - `MetricQuery` / `MetricGrouping`: the aggregation request.
//! - `DbError`: everything this crate can fail with.

pub mod connection;
pub mod error;
pub mod repository;

pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, MetricGrouping, MetricQuery};
