use core_types::Objective;
use objectives::create_calculator;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectiveInfo {
    pub objective: Objective,
    pub primary_kpis: Vec<&'static str>,
    pub secondary_kpis: Vec<&'static str>,
}

/// Every supported objective with its KPI layout.
pub fn objective_catalog() -> Vec<ObjectiveInfo> {
    Objective::ALL
        .into_iter()
        .map(|objective| {
            let calculator = create_calculator(objective);
            ObjectiveInfo {
                objective,
                primary_kpis: calculator.primary_kpis().to_vec(),
                secondary_kpis: calculator.secondary_kpis().to_vec(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_objective_once() {
        let catalog = objective_catalog();
        assert_eq!(catalog.len(), Objective::ALL.len());
        let traffic = catalog
            .iter()
            .find(|i| i.objective == Objective::Traffic)
            .unwrap();
        assert_eq!(traffic.primary_kpis, vec!["ctr", "cpc", "clicks"]);
    }

    #[test]
    fn catalog_serializes_objective_names() {
        let json = serde_json::to_value(objective_catalog()).unwrap();
        assert_eq!(json[0]["objective"], "awareness");
    }
}
