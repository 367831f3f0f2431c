use crate::{BenchmarkEngine, EngineError, DISPLAY_DP};
use chrono::{Datelike, NaiveDate};
use core_types::{DateRange, Granularity, MetricAggregate, MetricFilters};
use currency::ExchangeRates;
use objectives::{calculator_for, ObjectiveError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TimeseriesRequest {
    pub metric: String,
    pub objective: String,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeseriesPoint {
    /// First day of the bucket.
    pub period: NaiveDate,
    pub value: Decimal,
    pub raw_metrics: MetricAggregate,
}

impl BenchmarkEngine {
    /// One KPI value per period. Periods without rows are omitted.
    pub fn timeseries(
        &self,
        request: &TimeseriesRequest,
        range: &DateRange,
        filters: &MetricFilters,
        rows: &[MetricAggregate],
        rates: &ExchangeRates,
    ) -> Result<Vec<TimeseriesPoint>, EngineError> {
        let calculator = calculator_for(&request.objective)?;
        let formula = calculator
            .formula(&request.metric)
            .ok_or_else(|| ObjectiveError::UnknownKpi {
                objective: calculator.objective().to_string(),
                kpi: request.metric.clone(),
            })?;

        let normalized = self.scoped_rows(rows, range, filters, rates)?;

        let mut buckets: BTreeMap<NaiveDate, Vec<MetricAggregate>> = BTreeMap::new();
        let mut undated = 0usize;
        for row in normalized {
            match row.date {
                Some(day) => buckets
                    .entry(period_start(day, request.granularity))
                    .or_default()
                    .push(row),
                None => undated += 1,
            }
        }
        if undated > 0 {
            tracing::debug!(undated, "Skipping rows without a date in timeseries.");
        }

        let points = buckets
            .into_iter()
            .map(|(period, rows)| {
                let kpis = calculator.calculate_kpis(&rows);
                let raw_metrics = MetricAggregate {
                    date: Some(period),
                    ..MetricAggregate::total(&rows, rates.reporting_currency())
                };
                TimeseriesPoint {
                    period,
                    value: kpis.get(formula.name).unwrap_or_default().round_dp(DISPLAY_DP),
                    raw_metrics,
                }
            })
            .collect();
        Ok(points)
    }
}

/// The first day of the bucket `day` falls in. Weeks start on Monday.
pub fn period_start(day: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => day,
        Granularity::Week => {
            day - chrono::Duration::days(i64::from(day.weekday().num_days_from_monday()))
        }
        Granularity::Month => day.with_day(1).unwrap_or(day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use rust_decimal_macros::dec;

    fn request(metric: &str, granularity: Granularity) -> TimeseriesRequest {
        TimeseriesRequest {
            metric: metric.to_string(),
            objective: "leads".to_string(),
            granularity,
        }
    }

    #[test]
    fn buckets_start_on_period_boundaries() {
        // 2024-03-14 is a Thursday.
        let day = date(3, 14);
        assert_eq!(period_start(day, Granularity::Day), day);
        assert_eq!(period_start(day, Granularity::Week), date(3, 11));
        assert_eq!(period_start(day, Granularity::Month), date(3, 1));
    }

    #[test]
    fn daily_rows_roll_up_by_month() {
        let rows = vec![
            row(date(1, 3), "SAR", dec!(100)),
            row(date(1, 20), "SAR", dec!(300)),
            row(date(2, 7), "USD", dec!(100)),
        ];
        let points = engine()
            .timeseries(
                &request("cpc", Granularity::Month),
                &q1(),
                &MetricFilters::default(),
                &rows,
                &rates(),
            )
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].period, date(1, 1));
        assert_eq!(points[0].raw_metrics.spend, dec!(400));
        assert_eq!(points[0].raw_metrics.clicks, 500);
        assert_eq!(points[0].value, dec!(0.8));
        assert_eq!(points[1].period, date(2, 1));
        assert_eq!(points[1].value, dec!(1.5));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = engine()
            .timeseries(
                &request("happiness", Granularity::Day),
                &q1(),
                &MetricFilters::default(),
                &[],
                &rates(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Objective(ObjectiveError::UnknownKpi { ref kpi, .. }) if kpi == "happiness"
        ));
    }

    #[test]
    fn objective_specific_metrics_are_available() {
        let points = engine()
            .timeseries(
                &TimeseriesRequest {
                    metric: "cost_per_purchase".to_string(),
                    objective: "website_sales".to_string(),
                    granularity: Granularity::Day,
                },
                &q1(),
                &MetricFilters::default(),
                &[row(date(1, 3), "SAR", dec!(100))],
                &rates(),
            )
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, Decimal::ZERO);
    }
}
