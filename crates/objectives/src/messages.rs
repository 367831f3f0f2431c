use crate::kpi::{clicks, conversions, spend, KpiFormula, KpiUnit};
use crate::{ObjectiveCalculator, Objective};
use rust_decimal::Decimal;

/// Click-to-WhatsApp and messenger campaigns. Networks report started
/// conversations as conversions.
#[derive(Debug, Default, Clone, Copy)]
pub struct Messages;

const FORMULAS: &[KpiFormula] = &[
    KpiFormula::total("messages", KpiUnit::Count, conversions),
    KpiFormula::ratio("cost_per_message", KpiUnit::Currency, spend, conversions, Decimal::ONE),
    KpiFormula::ratio("message_rate", KpiUnit::Percent, conversions, clicks, Decimal::ONE_HUNDRED),
];

impl ObjectiveCalculator for Messages {
    fn objective(&self) -> Objective {
        Objective::Messages
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["messages", "cost_per_message", "message_rate"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["ctr", "cpc", "cpm", "impressions", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}
