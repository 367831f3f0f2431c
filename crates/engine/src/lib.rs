//! # Benchmark & KPI Engine
//!
//! The caller-facing operations of the platform: KPI summaries, timeseries,
//! spend breakdowns, industry benchmarks and insights. Every operation takes
//! its data pre-fetched and pre-scoped; the engine performs no I/O and holds
//! no state beyond its configuration.

use configuration::{BenchmarkConfig, Config, UnknownCurrencyPolicy};
use core_types::{DateRange, MetricAggregate, MetricFilters};
use currency::{CurrencyError, CurrencyNormalizer, ExchangeRates};

pub mod breakdown;
pub mod catalog;
pub mod error;
pub mod industry;
pub mod insights;
pub mod summary;
pub mod timeseries;

pub use breakdown::SpendBreakdownRow;
pub use catalog::{objective_catalog, ObjectiveInfo};
pub use error::EngineError;
pub use industry::{BenchmarkQuery, IndustryBenchmarks, IndustryEntry, MetricBenchmark};
pub use insights::{InsightReport, InsightScope};
pub use summary::{CurrencyBreakdown, KpiSummary};
pub use timeseries::{TimeseriesPoint, TimeseriesRequest};

/// Decimal places used for every KPI value the engine returns.
pub const DISPLAY_DP: u32 = 2;

/// Orchestrates the calculation crates.
#[derive(Debug, Clone)]
pub struct BenchmarkEngine {
    currency_policy: UnknownCurrencyPolicy,
    benchmarks: BenchmarkConfig,
}

impl BenchmarkEngine {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(config.currency.unknown_currency_policy, config.benchmarks.clone())
    }

    pub fn from_parts(currency_policy: UnknownCurrencyPolicy, benchmarks: BenchmarkConfig) -> Self {
        Self {
            currency_policy,
            benchmarks,
        }
    }

    pub fn benchmark_config(&self) -> &BenchmarkConfig {
        &self.benchmarks
    }

    /// Rows inside the range that pass the filters, converted to the
    /// reporting currency under the configured unknown-currency policy.
    pub(crate) fn scoped_rows(
        &self,
        rows: &[MetricAggregate],
        range: &DateRange,
        filters: &MetricFilters,
        rates: &ExchangeRates,
    ) -> Result<Vec<MetricAggregate>, EngineError> {
        let in_scope: Vec<&MetricAggregate> = rows
            .iter()
            .filter(|row| row.within(range) && filters.matches(row))
            .collect();
        self.normalize(in_scope, rates)
    }

    pub(crate) fn normalize<'r>(
        &self,
        rows: impl IntoIterator<Item = &'r MetricAggregate>,
        rates: &ExchangeRates,
    ) -> Result<Vec<MetricAggregate>, EngineError> {
        let normalizer = CurrencyNormalizer::new(rates);
        rows.into_iter()
            .map(|row| match normalizer.normalize_aggregate(row) {
                Ok(normalized) => Ok(normalized),
                Err(CurrencyError::UnknownCurrency(code))
                    if self.currency_policy == UnknownCurrencyPolicy::TreatAsReporting =>
                {
                    tracing::warn!(
                        currency = %code,
                        reporting = %rates.reporting_currency(),
                        "No exchange rate; treating amounts as reporting currency."
                    );
                    Ok(MetricAggregate {
                        currency: rates.reporting_currency().to_string(),
                        ..row.clone()
                    })
                }
                Err(e) => Err(e.into()),
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rows_are_scoped_and_normalized() {
        let rows = vec![
            row(date(1, 5), "USD", dec!(100)),
            row(date(4, 1), "SAR", dec!(999)),
            row(date(2, 5), "sar", dec!(100)),
        ];
        let scoped = engine()
            .scoped_rows(&rows, &q1(), &MetricFilters::default(), &rates())
            .unwrap();
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped[0].spend, dec!(375));
        assert_eq!(scoped[1].spend, dec!(100));
        assert!(scoped.iter().all(|r| r.currency == "SAR"));
    }

    #[test]
    fn unknown_currency_follows_policy() {
        let rows = vec![row(date(1, 5), "JPY", dec!(1000))];

        let strict = engine().scoped_rows(&rows, &q1(), &MetricFilters::default(), &rates());
        assert_eq!(
            strict.unwrap_err(),
            EngineError::Currency(CurrencyError::UnknownCurrency("JPY".to_string()))
        );

        let lenient = BenchmarkEngine::from_parts(
            UnknownCurrencyPolicy::TreatAsReporting,
            BenchmarkConfig::default(),
        );
        let scoped = lenient
            .scoped_rows(&rows, &q1(), &MetricFilters::default(), &rates())
            .unwrap();
        assert_eq!(scoped[0].spend, dec!(1000));
        assert_eq!(scoped[0].currency, "SAR");
    }
}
