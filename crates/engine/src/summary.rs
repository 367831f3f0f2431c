use crate::{BenchmarkEngine, EngineError, DISPLAY_DP};
use core_types::{DateRange, MetricAggregate, MetricFilters, Objective};
use currency::{CurrencyNormalizer, ExchangeRates};
use objectives::{calculator_for, KpiSet};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Spend in one source currency before and after conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyBreakdown {
    pub currency: String,
    /// Spend in the source currency.
    pub spend: Decimal,
    /// The same spend in the reporting currency. `None` when no rate is known.
    pub converted_spend: Option<Decimal>,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub objective: Objective,
    pub currency: String,
    pub kpis: KpiSet,
    pub primary_kpis: Vec<&'static str>,
    pub secondary_kpis: Vec<&'static str>,
    pub currency_breakdown: Vec<CurrencyBreakdown>,
}

impl BenchmarkEngine {
    /// KPIs for an objective over the in-scope rows, in the reporting currency.
    pub fn summary(
        &self,
        objective: &str,
        range: &DateRange,
        filters: &MetricFilters,
        rows: &[MetricAggregate],
        rates: &ExchangeRates,
    ) -> Result<KpiSummary, EngineError> {
        let calculator = calculator_for(objective)?;
        let normalized = self.scoped_rows(rows, range, filters, rates)?;

        let in_scope: Vec<&MetricAggregate> = rows
            .iter()
            .filter(|row| row.within(range) && filters.matches(row))
            .collect();
        let currency_breakdown = currency_breakdown(&in_scope, rates);

        let kpis = calculator
            .calculate_kpis(&normalized)
            .with_currency(rates.reporting_currency())
            .rounded(DISPLAY_DP);

        tracing::info!(
            objective = %calculator.objective(),
            rows = normalized.len(),
            currencies = currency_breakdown.len(),
            "Computed KPI summary."
        );

        Ok(KpiSummary {
            objective: calculator.objective(),
            currency: rates.reporting_currency().to_string(),
            kpis,
            primary_kpis: calculator.primary_kpis().to_vec(),
            secondary_kpis: calculator.secondary_kpis().to_vec(),
            currency_breakdown,
        })
    }
}

fn currency_breakdown(rows: &[&MetricAggregate], rates: &ExchangeRates) -> Vec<CurrencyBreakdown> {
    let mut by_currency: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for row in rows {
        let entry = by_currency
            .entry(row.currency.trim().to_ascii_uppercase())
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(row.spend);
        entry.1 += 1;
    }

    let normalizer = CurrencyNormalizer::new(rates);
    by_currency
        .into_iter()
        .map(|(currency, (spend, rows))| CurrencyBreakdown {
            converted_spend: normalizer
                .to_reporting_currency(spend, &currency)
                .ok()
                .map(|v| v.round_dp(DISPLAY_DP)),
            currency,
            spend,
            rows,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use currency::CurrencyError;
    use objectives::ObjectiveError;
    use rust_decimal_macros::dec;

    #[test]
    fn leads_summary_matches_hand_computed_kpis() {
        let rows = vec![row(date(2, 1), "SAR", dec!(500))];
        let summary = engine()
            .summary("leads", &q1(), &MetricFilters::default(), &rows, &rates())
            .unwrap();

        assert_eq!(summary.objective, Objective::Leads);
        assert_eq!(summary.currency, "SAR");
        assert_eq!(summary.kpis.get("ctr"), Some(dec!(2.5)));
        assert_eq!(summary.kpis.get("cpc"), Some(dec!(2)));
        assert_eq!(summary.kpis.get("cpm"), Some(dec!(50)));
        assert_eq!(summary.kpis.get("cvr"), Some(dec!(12)));
        assert_eq!(summary.kpis.get("cpl"), Some(dec!(16.67)));
        assert_eq!(summary.primary_kpis.first(), Some(&"leads"));
    }

    #[test]
    fn mixed_currencies_are_broken_down_and_summed_in_reporting_currency() {
        let rows = vec![
            row(date(1, 10), "USD", dec!(100)),
            row(date(1, 11), "SAR", dec!(125)),
            row(date(1, 12), "usd", dec!(20)),
        ];
        let summary = engine()
            .summary("traffic", &q1(), &MetricFilters::default(), &rows, &rates())
            .unwrap();

        assert_eq!(summary.kpis.get("spend"), Some(dec!(575)));
        assert_eq!(summary.currency_breakdown.len(), 2);
        let usd = summary
            .currency_breakdown
            .iter()
            .find(|b| b.currency == "USD")
            .unwrap();
        assert_eq!(usd.spend, dec!(120));
        assert_eq!(usd.converted_spend, Some(dec!(450)));
        assert_eq!(usd.rows, 2);
    }

    #[test]
    fn empty_scope_is_all_zero_in_reporting_currency() {
        let summary = engine()
            .summary("awareness", &q1(), &MetricFilters::default(), &[], &rates())
            .unwrap();
        assert_eq!(summary.kpis.currency(), "SAR");
        assert!(summary.kpis.iter().all(|(_, v)| v.is_zero()));
        assert!(summary.currency_breakdown.is_empty());
    }

    #[test]
    fn unknown_objective_is_a_validation_error() {
        let err = engine()
            .summary("rocket_science", &q1(), &MetricFilters::default(), &[], &rates())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Objective(ObjectiveError::InvalidObjective("rocket_science".to_string()))
        );
        assert!(err.is_validation());
    }

    #[test]
    fn conversion_overflow_is_a_data_error() {
        let rows = vec![row(date(2, 1), "USD", Decimal::MAX / dec!(2))];
        let err = engine()
            .summary("leads", &q1(), &MetricFilters::default(), &rows, &rates())
            .unwrap_err();
        assert!(matches!(err, EngineError::Currency(CurrencyError::Overflow { .. })));
        assert!(!err.is_validation());
    }

    #[test]
    fn huge_reporting_currency_spend_saturates() {
        let huge = Decimal::MAX / dec!(2);
        let rows = vec![
            row(date(2, 1), "SAR", huge),
            row(date(2, 2), "SAR", huge),
            row(date(2, 3), "SAR", huge),
        ];
        let summary = engine()
            .summary("leads", &q1(), &MetricFilters::default(), &rows, &rates())
            .unwrap();
        let sar = &summary.currency_breakdown[0];
        assert_eq!(sar.spend, Decimal::MAX);
        assert_eq!(sar.rows, 3);
    }

    #[test]
    fn filters_narrow_the_rows() {
        let mut meta_row = row(date(1, 2), "SAR", dec!(100));
        meta_row.platform = Some("meta".to_string());
        let mut google_row = row(date(1, 2), "SAR", dec!(300));
        google_row.platform = Some("google".to_string());

        let filters = MetricFilters {
            platforms: vec!["Meta".to_string()],
            ..MetricFilters::default()
        };
        let summary = engine()
            .summary("traffic", &q1(), &filters, &[meta_row, google_row], &rates())
            .unwrap();
        assert_eq!(summary.kpis.get("spend"), Some(dec!(100)));
    }
}
