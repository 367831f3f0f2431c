pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Dimension, Direction, Granularity, Objective, PerformanceStatus};
pub use error::CoreError;
pub use structs::{
    AccountMetrics, AccountProfile, CampaignMeta, DateRange, MetricAggregate, MetricFilters,
};
