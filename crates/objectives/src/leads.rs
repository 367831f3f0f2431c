use crate::kpi::{KpiFormula, RESULTS_CVR};
use crate::{ObjectiveCalculator, Objective};

/// Lead generation: forms, calls and WhatsApp enquiries.
#[derive(Debug, Default, Clone, Copy)]
pub struct Leads;

const FORMULAS: &[KpiFormula] = &[RESULTS_CVR];

impl ObjectiveCalculator for Leads {
    fn objective(&self) -> Objective {
        Objective::Leads
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["leads", "cpl", "cvr", "cost_per_result"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["ctr", "cpc", "cpm", "calls", "cost_per_call", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CampaignMeta, MetricAggregate};
    use rust_decimal_macros::dec;

    fn campaign_row(name: &str, spend: rust_decimal::Decimal, leads: u64, calls: u64) -> MetricAggregate {
        MetricAggregate {
            campaign: Some(CampaignMeta {
                id: name.to_lowercase(),
                name: name.to_string(),
                objective: None,
            }),
            spend,
            clicks: 100,
            leads,
            calls,
            ..MetricAggregate::empty("SAR")
        }
    }

    #[test]
    fn cost_per_result_mixes_lead_and_call_campaigns() {
        let rows = vec![
            campaign_row("Lead form", dec!(100), 10, 3),
            campaign_row("Call only", dec!(100), 2, 10),
        ];
        let kpis = Leads.calculate_kpis(&rows);

        // 10 leads from the lead campaign + 10 calls from the call campaign
        assert_eq!(kpis.get("results"), Some(dec!(20)));
        assert_eq!(kpis.get("cost_per_result"), Some(dec!(10)));
        assert_eq!(kpis.get("cpl"), Some(dec!(200) / dec!(12)));
        assert_eq!(kpis.get("cvr"), Some(dec!(10)));
    }
}
