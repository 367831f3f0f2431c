use crate::kpi::{clicks, impressions, spend, video_views, KpiFormula, KpiUnit, Totals};
use crate::{ObjectiveCalculator, Objective};
use rust_decimal::Decimal;

/// Post engagement and video campaigns. Clicks and views both count as engagements.
#[derive(Debug, Default, Clone, Copy)]
pub struct Engagement;

fn engagements(t: &Totals) -> Decimal {
    clicks(t) + video_views(t)
}

const FORMULAS: &[KpiFormula] = &[
    KpiFormula::total("engagements", KpiUnit::Count, engagements),
    KpiFormula::ratio("engagement_rate", KpiUnit::Percent, engagements, impressions, Decimal::ONE_HUNDRED),
    KpiFormula::ratio("cost_per_engagement", KpiUnit::Currency, spend, engagements, Decimal::ONE),
];

impl ObjectiveCalculator for Engagement {
    fn objective(&self) -> Objective {
        Objective::Engagement
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["engagement_rate", "cost_per_engagement", "engagements"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["ctr", "cpc", "cpm", "impressions", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}
