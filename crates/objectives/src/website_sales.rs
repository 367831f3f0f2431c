use crate::kpi::{purchases, revenue, spend, KpiFormula, KpiUnit, RESULTS_CVR};
use crate::{ObjectiveCalculator, Objective};
use rust_decimal::Decimal;

/// E-commerce sales campaigns.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebsiteSales;

const FORMULAS: &[KpiFormula] = &[
    RESULTS_CVR,
    KpiFormula::ratio("cost_per_purchase", KpiUnit::Currency, spend, purchases, Decimal::ONE),
    KpiFormula::ratio("aov", KpiUnit::Currency, revenue, purchases, Decimal::ONE),
];

impl ObjectiveCalculator for WebsiteSales {
    fn objective(&self) -> Objective {
        Objective::WebsiteSales
    }

    fn primary_kpis(&self) -> &'static [&'static str] {
        &["roas", "purchases", "cost_per_purchase", "cvr"]
    }

    fn secondary_kpis(&self) -> &'static [&'static str] {
        &["revenue", "aov", "cost_per_result", "ctr", "cpc", "cpm", "spend"]
    }

    fn objective_formulas(&self) -> &'static [KpiFormula] {
        FORMULAS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::MetricAggregate;
    use rust_decimal_macros::dec;

    #[test]
    fn sales_kpis() {
        let agg = MetricAggregate {
            spend: dec!(400),
            revenue: dec!(1800),
            clicks: 200,
            purchases: 12,
            ..MetricAggregate::empty("SAR")
        };
        let kpis = WebsiteSales.calculate_kpis(&[agg]);
        assert_eq!(kpis.get("roas"), Some(dec!(4.5)));
        assert_eq!(kpis.get("aov"), Some(dec!(150)));
        assert_eq!(kpis.get("cvr"), Some(dec!(6)));
        assert_eq!(kpis.get("cost_per_result"), kpis.get("cost_per_purchase"));
    }
}
