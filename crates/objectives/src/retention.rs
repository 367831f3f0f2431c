use crate::kpi::{purchases, revenue, spend, KpiFormula, KpiUnit};
use crate::{ObjectiveCalculator, Objective};
use rust_decimal::Decimal;

/// Re-engagement of existing customers. Conversions are repeat actions.
#[derive(Debug, Default, Clone, Copy)]
pub struct Retention;

const FORMULAS: &[KpiFormula] = &[
    KpiFormula::ratio("cost_per_purchase", KpiUnit::Currency, spend, purchases, Decimal::ONE),
    KpiFormula::ratio("aov", KpiUnit::Currency, revenue, purchases, Decimal::ONE),
];

impl ObjectiveCalculator for Retention {
    fn objective(&self) -> Objective {
        Objective::Retention
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["roas", "conversions", "cpa", "aov"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["revenue", "purchases", "cost_per_purchase", "ctr", "cpc", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}
