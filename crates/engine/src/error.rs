use benchmarks::BenchmarkError;
use core_types::CoreError;
use currency::CurrencyError;
use objectives::ObjectiveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Objective error: {0}")]
    Objective(#[from] ObjectiveError),

    #[error("Currency error: {0}")]
    Currency(#[from] CurrencyError),

    #[error("Benchmark error: {0}")]
    Benchmark(#[from] BenchmarkError),

    #[error("Invalid input: {0}")]
    Core(#[from] CoreError),

    #[error("No accounts are available to benchmark")]
    EmptyPopulation,
}

impl EngineError {
    /// Errors caused by the request rather than by the data or the system.
    pub fn is_validation(&self) -> bool {
        match self {
            EngineError::Objective(_) | EngineError::Core(_) => true,
            EngineError::Currency(e) => !e.is_data_error(),
            EngineError::Benchmark(_) | EngineError::EmptyPopulation => false,
        }
    }
}
