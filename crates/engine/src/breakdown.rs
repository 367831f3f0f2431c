use crate::{BenchmarkEngine, EngineError, DISPLAY_DP};
use core_types::{DateRange, MetricAggregate, MetricFilters};
use currency::ExchangeRates;
use objectives::kpi::safe_ratio;
use objectives::{resolve_results, ResultsSource};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Campaign id used for rows that carry no campaign metadata.
pub const UNATTRIBUTED: &str = "unattributed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendBreakdownRow {
    pub campaign_id: String,
    pub campaign_name: String,
    pub objective: Option<String>,
    pub spend: Decimal,
    pub results: u64,
    pub results_source: ResultsSource,
    pub cost_per_result: Decimal,
}

impl BenchmarkEngine {
    /// Spend and resolved results per campaign, highest spend first.
    ///
    /// Results are resolved with the same policy the KPI calculators use, so
    /// cost per result here matches the summary.
    pub fn spend_breakdown(
        &self,
        range: &DateRange,
        filters: &MetricFilters,
        rows: &[MetricAggregate],
        rates: &ExchangeRates,
    ) -> Result<Vec<SpendBreakdownRow>, EngineError> {
        let normalized = self.scoped_rows(rows, range, filters, rates)?;

        let mut by_campaign: BTreeMap<String, SpendBreakdownRow> = BTreeMap::new();
        for row in &normalized {
            let resolved = resolve_results(row);
            let (id, name, objective) = match &row.campaign {
                Some(c) => (c.id.clone(), c.name.clone(), c.objective.clone()),
                None => (UNATTRIBUTED.to_string(), UNATTRIBUTED.to_string(), None),
            };
            let entry = by_campaign
                .entry(id.clone())
                .or_insert_with(|| SpendBreakdownRow {
                    campaign_id: id,
                    campaign_name: name,
                    objective,
                    spend: Decimal::ZERO,
                    results: 0,
                    results_source: resolved.source,
                    cost_per_result: Decimal::ZERO,
                });
            entry.spend = entry.spend.saturating_add(row.spend);
            entry.results = entry.results.saturating_add(resolved.count);
            if entry.results_source == ResultsSource::None {
                entry.results_source = resolved.source;
            }
        }

        let mut breakdown: Vec<SpendBreakdownRow> = by_campaign
            .into_values()
            .map(|mut row| {
                row.cost_per_result = safe_ratio(row.spend, Decimal::from(row.results), Decimal::ONE)
                    .unwrap_or_default()
                    .round_dp(DISPLAY_DP);
                row.spend = row.spend.round_dp(DISPLAY_DP);
                row
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.spend
                .cmp(&a.spend)
                .then_with(|| a.campaign_id.cmp(&b.campaign_id))
        });
        Ok(breakdown)
    }
}
