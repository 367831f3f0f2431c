//! # Objective KPI Calculators
//!
//! This crate turns raw metric aggregates into the KPIs that matter for a
//! campaign objective. It defines a universal `ObjectiveCalculator` trait and
//! one implementation per objective.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure arithmetic. No I/O, no currency handling; callers
//!   pass aggregates that are already in the reporting currency.
//! - **Total Functions:** Calculators never fail on edge input. Empty input or a
//!   zero denominator yields a KPI of zero, never NaN or a panic.
//! - **Extensibility:** Adding an objective means a new module implementing the
//!   trait, a variant on `core_types::Objective`, and an arm in the `factory`.
//!
//! ## Public API
//!
//! - `ObjectiveCalculator`: the trait every objective implements.
//! - `create_calculator` / `calculator_for`: the factory.
//! - `KpiSet`, `KpiFormula`, `KpiUnit`: KPI values and their definitions.
//! - `resolve_results`: the shared results-resolution policy.

// Declare all the modules that constitute this crate.
pub mod app_installs;
pub mod awareness;
pub mod engagement;
pub mod error;
pub mod factory;
pub mod in_app_actions;
pub mod kpi;
pub mod leads;
pub mod messages;
pub mod results;
pub mod retention;
pub mod traffic;
pub mod website_sales;

// Re-export the key components to create a clean, public-facing API.
pub use error::ObjectiveError;
pub use factory::{calculator_for, create_calculator};
pub use kpi::{KpiFormula, KpiSet, KpiUnit, Totals};
pub use results::{resolve_results, ResolutionRule, ResolvedResults, ResultsSource};

pub use core_types::Objective;

use core_types::MetricAggregate;
use kpi::{common_formula, COMMON_FORMULAS};
use rust_decimal::Decimal;

/// The core trait that all objective calculators implement.
///
/// Implementations are stateless descriptions of an objective: which KPIs it
/// adds or redefines, and how they are ordered for display. The computation
/// itself lives in the provided methods so every objective applies the same
/// zero-denominator guards.
///
/// The `Send + Sync` bounds let one calculator be shared by the parallel
/// benchmark aggregation.
pub trait ObjectiveCalculator: Send + Sync {
    fn objective(&self) -> Objective;

    /// KPIs shown first for this objective, in display order.
    fn primary_kpis(&self) -> &'static [&'static str];

    /// Supporting KPIs, in display order.
    fn secondary_kpis(&self) -> &'static [&'static str];

    /// KPIs this objective adds, or redefines when a name clashes with a
    /// common KPI.
    fn objective_formulas(&self) -> &'static [KpiFormula] {
        &[]
    }

    /// Looks up a KPI definition, preferring the objective's own.
    fn formula(&self, name: &str) -> Option<&'static KpiFormula> {
        self.objective_formulas()
            .iter()
            .find(|f| f.name == name)
            .or_else(|| common_formula(name))
    }

    /// Names of every KPI this calculator produces.
    fn kpi_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = COMMON_FORMULAS.iter().map(|f| f.name).collect();
        for f in self.objective_formulas() {
            if !names.contains(&f.name) {
                names.push(f.name);
            }
        }
        names
    }

    /// Computes every KPI over the given aggregates.
    ///
    /// Never fails: empty input produces a set with every KPI at zero.
    fn calculate_kpis(&self, aggregates: &[MetricAggregate]) -> KpiSet {
        let totals = Totals::collect(aggregates);
        let mut kpis = KpiSet::new(self.objective(), &totals.metrics.currency);

        for formula in COMMON_FORMULAS {
            if self.objective_formulas().iter().any(|f| f.name == formula.name) {
                continue;
            }
            kpis.insert(formula, formula.value(&totals));
        }
        for formula in self.objective_formulas() {
            kpis.insert(formula, formula.value(&totals));
        }

        tracing::debug!(
            objective = %self.objective(),
            rows = aggregates.len(),
            kpis = kpis.len(),
            "Calculated KPI set."
        );
        kpis
    }

    /// A single KPI for benchmark sampling, or `None` when it is undefined
    /// (zero denominator) or unknown to this objective.
    fn sample(&self, name: &str, aggregates: &[MetricAggregate]) -> Option<Decimal> {
        let formula = self.formula(name)?;
        formula.sample(&Totals::collect(aggregates))
    }
}
