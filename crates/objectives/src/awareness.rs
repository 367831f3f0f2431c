use crate::kpi::{impressions, spend, video_views, KpiFormula, KpiUnit};
use crate::{ObjectiveCalculator, Objective};
use rust_decimal::Decimal;

/// Reach and brand-recall campaigns. Success is cheap, broad delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct Awareness;

const FORMULAS: &[KpiFormula] = &[
    KpiFormula::ratio("cost_per_view", KpiUnit::Currency, spend, video_views, Decimal::ONE),
    KpiFormula::ratio("view_rate", KpiUnit::Percent, video_views, impressions, Decimal::ONE_HUNDRED),
];

impl ObjectiveCalculator for Awareness {
    fn objective(&self) -> Objective {
        Objective::Awareness
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["cpm", "reach", "frequency", "impressions"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["video_views", "view_rate", "cost_per_view", "ctr", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}
