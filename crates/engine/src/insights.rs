use crate::industry::{is_request_error, BenchmarkQuery, ClassifiedGroup};
use crate::{BenchmarkEngine, EngineError};
use analyzer::{
    in_line_insight, neutral_insight, summarize_industries, ClassifiedMetric, Insight,
    InsightGenerator,
};
use core_types::{AccountMetrics, PerformanceStatus};
use currency::ExchangeRates;
use serde::Serialize;
use uuid::Uuid;

/// Whose performance the insights are about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightScope {
    /// Rank every industry against the others.
    AllIndustries,
    Industry(String),
    Account(Uuid),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    /// True when live benchmarks were unavailable.
    pub fallback: bool,
    pub insights: Vec<Insight>,
}

impl BenchmarkEngine {
    /// Insights for a scope. Never returns an empty list: when nothing can be
    /// said a neutral insight is returned instead.
    pub fn insights(
        &self,
        query: &BenchmarkQuery,
        scope: &InsightScope,
        accounts: &[AccountMetrics],
        rates: &ExchangeRates,
    ) -> Result<InsightReport, EngineError> {
        let mut query = query.clone();
        match scope {
            InsightScope::AllIndustries => {}
            InsightScope::Industry(industry) => query.filters.industry = Some(industry.clone()),
            InsightScope::Account(id) => query.filters.account_ids = vec![*id],
        }

        let groups = match self.classified_groups(&query, accounts, rates) {
            Ok(groups) => groups,
            Err(e) if is_request_error(&e) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Live benchmarks failed; serving neutral insight.");
                return Ok(InsightReport {
                    fallback: true,
                    insights: vec![neutral_insight()],
                });
            }
        };

        let insights = match scope {
            InsightScope::AllIndustries => summarize_industries(&by_industry(&groups)),
            InsightScope::Industry(_) | InsightScope::Account(_) => {
                let classified: Vec<ClassifiedMetric> =
                    groups.into_iter().flat_map(|g| g.metrics).collect();
                let insights = InsightGenerator::new().generate(&classified);
                if !insights.is_empty() {
                    insights
                } else if classified.iter().all(|m| m.status == PerformanceStatus::NoData) {
                    vec![neutral_insight()]
                } else {
                    vec![in_line_insight()]
                }
            }
        };

        Ok(InsightReport {
            fallback: false,
            insights,
        })
    }
}

/// Groups for ranking, labelled by industry. Refined groups of the same
/// industry are ranked separately under their full key.
fn by_industry(groups: &[ClassifiedGroup]) -> Vec<(String, Vec<ClassifiedMetric>)> {
    groups
        .iter()
        .map(|g| (g.key.to_string(), g.metrics.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::industry::tests::{account, query, retail_population};
    use analyzer::InsightKind;

    #[test]
    fn industries_are_ranked_against_each_other() {
        let mut population = retail_population();
        population.push(account("travel", "SAR", 50));
        population.push(account("travel", "SAR", 60));

        let report = engine()
            .insights(&query(None), &InsightScope::AllIndustries, &population, &rates())
            .unwrap();
        assert!(!report.fallback);
        let kinds: Vec<_> = report.insights.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InsightKind::BestPerforming, InsightKind::NeedsImprovement]);
    }

    #[test]
    fn account_scope_reports_that_accounts_metrics() {
        let mut population = retail_population();
        let laggard = account("retail", "SAR", 10);
        let id = laggard.profile.account_id;
        population.push(laggard);

        let report = engine()
            .insights(&query(None), &InsightScope::Account(id), &population, &rates())
            .unwrap();
        let ctr = report
            .insights
            .iter()
            .find(|i| i.subject.as_deref() == Some("ctr"))
            .unwrap();
        assert_eq!(ctr.kind, InsightKind::Improvement);
    }

    #[test]
    fn unknown_industry_gets_a_flagged_neutral_insight() {
        let report = engine()
            .insights(
                &query(None),
                &InsightScope::Industry("aerospace".to_string()),
                &retail_population(),
                &rates(),
            )
            .unwrap();
        assert!(report.fallback);
        assert_eq!(report.insights, vec![neutral_insight()]);
    }

    #[test]
    fn thin_industry_gets_a_neutral_insight() {
        let report = engine()
            .insights(
                &query(None),
                &InsightScope::Industry("retail".to_string()),
                &[account("retail", "SAR", 100)],
                &rates(),
            )
            .unwrap();
        assert!(!report.fallback);
        assert_eq!(report.insights, vec![neutral_insight()]);
    }
}
