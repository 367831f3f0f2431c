use crate::{ObjectiveCalculator, Objective};

/// Link-click campaigns. The common CTR/CPC pair tells the whole story.
#[derive(Debug, Default, Clone, Copy)]
pub struct Traffic;

impl ObjectiveCalculator for Traffic {
    fn objective(&self) -> Objective {
        Objective::Traffic
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["ctr", "cpc", "clicks"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["cpm", "impressions", "reach", "spend"]
    }
}
