use crate::app_installs::AppInstalls;
use crate::awareness::Awareness;
use crate::engagement::Engagement;
use crate::error::ObjectiveError;
use crate::in_app_actions::InAppActions;
use crate::leads::Leads;
use crate::messages::Messages;
use crate::retention::Retention;
use crate::traffic::Traffic;
use crate::website_sales::WebsiteSales;
use crate::ObjectiveCalculator;
use core_types::Objective;

/// Creates the calculator for a known objective.
pub fn create_calculator(objective: Objective) -> Box<dyn ObjectiveCalculator> {
    // The compiler will error if a new Objective is added but not handled here.
    match objective {
        Objective::Awareness => Box::new(Awareness),
        Objective::Engagement => Box::new(Engagement),
        Objective::Traffic => Box::new(Traffic),
        Objective::Messages => Box::new(Messages),
        Objective::AppInstalls => Box::new(AppInstalls),
        Objective::InAppActions => Box::new(InAppActions),
        Objective::Leads => Box::new(Leads),
        Objective::WebsiteSales => Box::new(WebsiteSales),
        Objective::Retention => Box::new(Retention),
    }
}

/// Resolves an objective name from a request into its calculator.
///
/// Unknown names are an error; there is no default objective.
pub fn calculator_for(name: &str) -> Result<Box<dyn ObjectiveCalculator>, ObjectiveError> {
    let objective: Objective = name
        .parse()
        .map_err(|_| ObjectiveError::InvalidObjective(name.to_string()))?;
    Ok(create_calculator(objective))
}
