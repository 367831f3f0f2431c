use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjectiveError {
    #[error("Objective '{0}' has no registered calculator")]
    InvalidObjective(String),

    #[error("KPI '{kpi}' is not defined for objective '{objective}'")]
    UnknownKpi { objective: String, kpi: String },
}
