use crate::kpi::{conversions, spend, KpiFormula, KpiUnit};
use crate::{ObjectiveCalculator, Objective};
use rust_decimal::Decimal;

/// Mobile app install campaigns. Installs arrive as conversions.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppInstalls;

const FORMULAS: &[KpiFormula] = &[
    KpiFormula::total("installs", KpiUnit::Count, conversions),
    KpiFormula::ratio("cost_per_install", KpiUnit::Currency, spend, conversions, Decimal::ONE),
];

impl ObjectiveCalculator for AppInstalls {
    fn objective(&self) -> Objective {
        Objective::AppInstalls
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["installs", "cost_per_install", "cvr"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["ctr", "cpc", "cpm", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}
