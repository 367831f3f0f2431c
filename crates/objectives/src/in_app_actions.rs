use crate::kpi::{KpiFormula, RESULTS_CVR};
use crate::{ObjectiveCalculator, Objective};

/// In-app event campaigns. What counts as an action differs per campaign, so
/// conversion rate and cost-per-result run on resolved results.
#[derive(Debug, Default, Clone, Copy)]
pub struct InAppActions;

const FORMULAS: &[KpiFormula] = &[RESULTS_CVR];

impl ObjectiveCalculator for InAppActions {
    fn objective(&self) -> Objective {
        Objective::InAppActions
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["results", "cost_per_result", "cvr"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["roas", "ctr", "cpc", "cpm", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}
