use crate::results::resolve_results;
use core_types::{MetricAggregate, Objective};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// What a KPI value is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiUnit {
    /// Currency-free percentage (0–100).
    Percent,
    /// Denominated in the KpiSet's currency.
    Currency,
    /// Dimensionless ratio such as ROAS or frequency.
    Ratio,
    /// Raw count.
    Count,
}

/// Raw counters summed over a set of aggregates, plus the resolved results count.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub metrics: MetricAggregate,
    pub results: u64,
}

impl Totals {
    /// Sums the aggregates and resolves results row by row, so each row's
    /// campaign metadata decides its own results counter.
    pub fn collect(aggregates: &[MetricAggregate]) -> Self {
        let metrics = MetricAggregate::total(aggregates, "");
        let results = aggregates
            .iter()
            .map(|agg| resolve_results(agg).count)
            .fold(0u64, u64::saturating_add);
        Self { metrics, results }
    }
}

type Extractor = fn(&Totals) -> Decimal;

/// A named KPI: either a raw total or a guarded ratio.
#[derive(Debug, Clone, Copy)]
pub struct KpiFormula {
    pub name: &'static str,
    pub unit: KpiUnit,
    numerator: Extractor,
    denominator: Option<Extractor>,
    scale: Decimal,
}

impl KpiFormula {
    pub const fn total(name: &'static str, unit: KpiUnit, value: Extractor) -> Self {
        Self {
            name,
            unit,
            numerator: value,
            denominator: None,
            scale: Decimal::ONE,
        }
    }

    pub const fn ratio(
        name: &'static str,
        unit: KpiUnit,
        numerator: Extractor,
        denominator: Extractor,
        scale: Decimal,
    ) -> Self {
        Self {
            name,
            unit,
            numerator,
            denominator: Some(denominator),
            scale,
        }
    }

    pub fn is_total(&self) -> bool {
        self.denominator.is_none()
    }

    /// The KPI value, or `None` when its denominator is zero.
    pub fn sample(&self, totals: &Totals) -> Option<Decimal> {
        let numerator = (self.numerator)(totals);
        match self.denominator {
            None => Some(numerator),
            Some(denominator) => safe_ratio(numerator, denominator(totals), self.scale),
        }
    }

    /// The KPI value, with zero standing in for an undefined ratio.
    pub fn value(&self, totals: &Totals) -> Decimal {
        self.sample(totals).unwrap_or(Decimal::ZERO)
    }
}

/// `numerator / denominator * scale`, or `None` for a zero denominator or overflow.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal, scale: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_mul(scale)?.checked_div(denominator)
}

pub(crate) fn spend(t: &Totals) -> Decimal {
    t.metrics.spend
}
pub(crate) fn revenue(t: &Totals) -> Decimal {
    t.metrics.revenue
}
pub(crate) fn impressions(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.impressions)
}
pub(crate) fn clicks(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.clicks)
}
pub(crate) fn conversions(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.conversions)
}
pub(crate) fn leads(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.leads)
}
pub(crate) fn calls(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.calls)
}
pub(crate) fn purchases(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.purchases)
}
pub(crate) fn reach(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.reach)
}
pub(crate) fn video_views(t: &Totals) -> Decimal {
    Decimal::from(t.metrics.video_views)
}
pub(crate) fn results(t: &Totals) -> Decimal {
    Decimal::from(t.results)
}

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const THOUSAND: Decimal = Decimal::ONE_THOUSAND;

/// KPIs every objective computes.
pub const COMMON_FORMULAS: &[KpiFormula] = &[
    KpiFormula::total("spend", KpiUnit::Currency, spend),
    KpiFormula::total("revenue", KpiUnit::Currency, revenue),
    KpiFormula::total("impressions", KpiUnit::Count, impressions),
    KpiFormula::total("clicks", KpiUnit::Count, clicks),
    KpiFormula::total("conversions", KpiUnit::Count, conversions),
    KpiFormula::total("leads", KpiUnit::Count, leads),
    KpiFormula::total("calls", KpiUnit::Count, calls),
    KpiFormula::total("purchases", KpiUnit::Count, purchases),
    KpiFormula::total("reach", KpiUnit::Count, reach),
    KpiFormula::total("video_views", KpiUnit::Count, video_views),
    KpiFormula::total("results", KpiUnit::Count, results),
    KpiFormula::ratio("ctr", KpiUnit::Percent, clicks, impressions, HUNDRED),
    KpiFormula::ratio("cpc", KpiUnit::Currency, spend, clicks, Decimal::ONE),
    KpiFormula::ratio("cpm", KpiUnit::Currency, spend, impressions, THOUSAND),
    KpiFormula::ratio("cvr", KpiUnit::Percent, conversions, clicks, HUNDRED),
    KpiFormula::ratio("cpl", KpiUnit::Currency, spend, leads, Decimal::ONE),
    KpiFormula::ratio("cpa", KpiUnit::Currency, spend, conversions, Decimal::ONE),
    KpiFormula::ratio("cost_per_call", KpiUnit::Currency, spend, calls, Decimal::ONE),
    KpiFormula::ratio("cost_per_result", KpiUnit::Currency, spend, results, Decimal::ONE),
    KpiFormula::ratio("roas", KpiUnit::Ratio, revenue, spend, Decimal::ONE),
    KpiFormula::ratio("frequency", KpiUnit::Ratio, impressions, reach, Decimal::ONE),
];

/// Conversion rate measured on resolved results instead of raw conversions.
/// Objectives whose success counter varies per campaign use this in place of
/// the common `cvr`.
pub const RESULTS_CVR: KpiFormula = KpiFormula::ratio("cvr", KpiUnit::Percent, results, clicks, HUNDRED);

pub fn common_formula(name: &str) -> Option<&'static KpiFormula> {
    COMMON_FORMULAS.iter().find(|f| f.name == name)
}

/// KPI values computed under one objective, in one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    objective: Objective,
    currency: String,
    values: BTreeMap<String, Decimal>,
    #[serde(skip)]
    units: BTreeMap<String, KpiUnit>,
}

impl KpiSet {
    pub fn new(objective: Objective, currency: &str) -> Self {
        Self {
            objective,
            currency: currency.to_string(),
            values: BTreeMap::new(),
            units: BTreeMap::new(),
        }
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Retags the currency. Used when a set was computed from no rows and so
    /// could not infer one.
    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    pub fn insert(&mut self, formula: &KpiFormula, value: Decimal) {
        self.values.insert(formula.name.to_string(), value);
        self.units.insert(formula.name.to_string(), formula.unit);
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.values.get(name).copied()
    }

    pub fn unit(&self, name: &str) -> Option<KpiUnit> {
        self.units.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sets are only comparable when computed under the same objective and currency.
    pub fn comparable_with(&self, other: &KpiSet) -> bool {
        self.objective == other.objective && self.currency.eq_ignore_ascii_case(&other.currency)
    }

    /// A copy with every value rounded to `dp` decimal places, for display.
    pub fn rounded(&self, dp: u32) -> KpiSet {
        KpiSet {
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v.round_dp(dp)))
                .collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn safe_ratio_guards_zero_denominator() {
        assert_eq!(safe_ratio(dec!(5), Decimal::ZERO, Decimal::ONE), None);
        assert_eq!(safe_ratio(dec!(250), dec!(10000), HUNDRED), Some(dec!(2.5)));
    }

    #[test]
    fn totals_resolve_results_per_row() {
        let rows = vec![
            MetricAggregate {
                leads: 4,
                conversions: 10,
                ..MetricAggregate::empty("SAR")
            },
            MetricAggregate {
                conversions: 3,
                ..MetricAggregate::empty("SAR")
            },
        ];

        let totals = Totals::collect(&rows);

        // first row resolves to leads, second falls through to conversions
        assert_eq!(totals.results, 7);
        assert_eq!(totals.metrics.conversions, 13);
    }

    #[test]
    fn comparable_requires_matching_objective_and_currency() {
        let a = KpiSet::new(Objective::Leads, "SAR");
        assert!(a.comparable_with(&KpiSet::new(Objective::Leads, "sar")));
        assert!(!a.comparable_with(&KpiSet::new(Objective::Leads, "USD")));
        assert!(!a.comparable_with(&KpiSet::new(Objective::Traffic, "SAR")));
    }
}
