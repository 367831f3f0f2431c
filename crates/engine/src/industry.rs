use crate::{BenchmarkEngine, EngineError, DISPLAY_DP};
use analyzer::{ClassifiedMetric, PerformanceClassifier};
use benchmarks::fallback::{FALLBACK_BENCHMARKS, FALLBACK_CURRENCY};
use benchmarks::{fallback_for, BenchmarkAggregator, DimensionSet, GroupKey, MetricRange};
use core_types::{
    AccountMetrics, DateRange, MetricAggregate, MetricFilters, Objective, PerformanceStatus,
};
use currency::{CurrencyNormalizer, ExchangeRates};
use objectives::kpi::common_formula;
use objectives::{create_calculator, KpiUnit};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scope of a benchmark request.
#[derive(Debug, Clone)]
pub struct BenchmarkQuery {
    pub range: DateRange,
    /// `industry` narrows the peer population; account, campaign and
    /// platform filters select whose performance is compared against it.
    pub filters: MetricFilters,
    /// Decides how results-based KPIs such as CVR are computed.
    pub objective: Objective,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBenchmark {
    pub actual: Option<Decimal>,
    /// Live benchmarks report p25/p50/p75 as min/avg/max.
    pub benchmark: Option<MetricRange>,
    pub sample_size: usize,
    pub performance: Option<Decimal>,
    pub status: PerformanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryEntry {
    pub accounts_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<MetricAggregate>,
    pub metrics: BTreeMap<String, MetricBenchmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryBenchmarks {
    /// True when the static dataset was served instead of live benchmarks.
    pub fallback: bool,
    pub objective: Objective,
    pub currency: String,
    pub industries: BTreeMap<String, IndustryEntry>,
}

/// A benchmark group with its KPIs already classified.
#[derive(Debug, Clone)]
pub(crate) struct ClassifiedGroup {
    pub key: GroupKey,
    pub accounts_count: usize,
    pub totals: MetricAggregate,
    pub metrics: Vec<ClassifiedMetric>,
}

impl BenchmarkEngine {
    /// Live percentile benchmarks per group, with the selected accounts'
    /// actual KPIs classified against them.
    pub fn industry_benchmarks(
        &self,
        query: &BenchmarkQuery,
        accounts: &[AccountMetrics],
        rates: &ExchangeRates,
    ) -> Result<IndustryBenchmarks, EngineError> {
        let groups = self.classified_groups(query, accounts, rates)?;

        let industries = groups
            .into_iter()
            .map(|group| {
                let metrics = group
                    .metrics
                    .into_iter()
                    .map(|m| {
                        let entry = MetricBenchmark {
                            actual: m.actual.map(|v| v.round_dp(DISPLAY_DP)),
                            benchmark: m.band.map(|b| MetricRange {
                                min: b.p25.round_dp(DISPLAY_DP),
                                avg: b.p50.round_dp(DISPLAY_DP),
                                max: b.p75.round_dp(DISPLAY_DP),
                            }),
                            sample_size: m.band.map(|b| b.sample_size).unwrap_or_default(),
                            performance: m.performance.map(|p| p.round_dp(1)),
                            status: m.status,
                        };
                        (m.metric, entry)
                    })
                    .collect();
                let entry = IndustryEntry {
                    accounts_count: group.accounts_count,
                    totals: Some(group.totals),
                    metrics,
                };
                (group.key.to_string(), entry)
            })
            .collect();

        Ok(IndustryBenchmarks {
            fallback: false,
            objective: query.objective,
            currency: rates.reporting_currency().to_string(),
            industries,
        })
    }

    /// Live benchmarks, or the static dataset when they cannot be produced.
    ///
    /// Only errors caused by the request itself are returned.
    pub fn industry_benchmarks_or_fallback(
        &self,
        query: &BenchmarkQuery,
        accounts: &[AccountMetrics],
        rates: &ExchangeRates,
    ) -> Result<IndustryBenchmarks, EngineError> {
        match self.industry_benchmarks(query, accounts, rates) {
            Ok(live) if !live.industries.is_empty() => Ok(live),
            Ok(_) => {
                tracing::info!("No live benchmark groups; serving static benchmarks.");
                Ok(self.fallback_benchmarks(query, rates))
            }
            Err(e) if is_request_error(&e) => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Live benchmarks failed; serving static benchmarks.");
                Ok(self.fallback_benchmarks(query, rates))
            }
        }
    }

    /// The static dataset, converted into the reporting currency when a rate
    /// for it is known.
    pub fn fallback_benchmarks(&self, query: &BenchmarkQuery, rates: &ExchangeRates) -> IndustryBenchmarks {
        let normalizer = CurrencyNormalizer::new(rates);
        let rate = normalizer.rate_for(FALLBACK_CURRENCY).ok();
        let currency = match rate {
            Some(_) => rates.reporting_currency(),
            None => FALLBACK_CURRENCY,
        };

        let selected: Vec<_> = match &query.filters.industry {
            Some(industry) => vec![fallback_for(industry)],
            None => FALLBACK_BENCHMARKS.iter().collect(),
        };

        let industries = selected
            .into_iter()
            .map(|fallback| {
                let metrics = fallback
                    .metrics()
                    .into_iter()
                    .map(|(name, range)| {
                        let range = match rate {
                            Some(rate) if is_monetary(name) => MetricRange {
                                min: range.min.saturating_mul(rate).round_dp(DISPLAY_DP),
                                avg: range.avg.saturating_mul(rate).round_dp(DISPLAY_DP),
                                max: range.max.saturating_mul(rate).round_dp(DISPLAY_DP),
                            },
                            _ => range,
                        };
                        let entry = MetricBenchmark {
                            actual: None,
                            benchmark: Some(range),
                            sample_size: 0,
                            performance: None,
                            status: PerformanceStatus::NoData,
                        };
                        (name.to_string(), entry)
                    })
                    .collect();
                let entry = IndustryEntry {
                    accounts_count: 0,
                    totals: None,
                    metrics,
                };
                (fallback.industry.to_string(), entry)
            })
            .collect();

        IndustryBenchmarks {
            fallback: true,
            objective: query.objective,
            currency: currency.to_string(),
            industries,
        }
    }

    pub(crate) fn classified_groups(
        &self,
        query: &BenchmarkQuery,
        accounts: &[AccountMetrics],
        rates: &ExchangeRates,
    ) -> Result<Vec<ClassifiedGroup>, EngineError> {
        let population = accounts
            .iter()
            .filter(|a| {
                query
                    .filters
                    .industry
                    .as_ref()
                    .is_none_or(|i| i.trim().eq_ignore_ascii_case(a.profile.industry.trim()))
            })
            .map(|a| {
                Ok::<_, EngineError>(AccountMetrics {
                    profile: a.profile.clone(),
                    aggregates: self.normalize(&a.aggregates, rates)?,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        if population.is_empty() {
            return Err(EngineError::EmptyPopulation);
        }

        let config = self.benchmark_config();
        let dimensions = DimensionSet::from_names(&config.default_dimensions)?;
        let aggregator = BenchmarkAggregator::new(
            query.objective,
            &config.metrics,
            config.min_accounts,
            rates.reporting_currency(),
        )?;
        let table = aggregator.compute_benchmarks(&population, &dimensions, &query.range)?;

        let calculator = create_calculator(query.objective);
        let classifier = PerformanceClassifier::new();

        let groups = table
            .groups
            .into_iter()
            .map(|group| {
                let selected: Vec<MetricAggregate> = population
                    .iter()
                    .filter(|a| dimensions.key_for(&a.profile) == group.key)
                    .filter(|a| is_selected(&query.filters, a))
                    .flat_map(|a| a.aggregates.iter())
                    .filter(|row| row.within(&query.range) && campaign_selected(&query.filters, row))
                    .cloned()
                    .collect();

                let metrics = aggregator
                    .metrics()
                    .iter()
                    .map(|metric| {
                        let actual = if selected.is_empty() {
                            None
                        } else {
                            calculator.sample(metric, &selected)
                        };
                        classifier.classify_metric(metric, actual, group.outcome(metric))
                    })
                    .collect();

                ClassifiedGroup {
                    key: group.key,
                    accounts_count: group.accounts_count,
                    totals: group.totals,
                    metrics,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            objective = %query.objective,
            accounts = population.len(),
            groups = groups.len(),
            "Computed industry benchmarks."
        );
        Ok(groups)
    }
}

/// Whether an account's own performance is being compared.
fn is_selected(filters: &MetricFilters, account: &AccountMetrics) -> bool {
    let id_ok = filters.account_ids.is_empty() || filters.account_ids.contains(&account.profile.account_id);
    let platform_ok = filters.platforms.is_empty()
        || filters
            .platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&account.profile.platform));
    id_ok && platform_ok
}

fn campaign_selected(filters: &MetricFilters, row: &MetricAggregate) -> bool {
    filters.campaign_ids.is_empty()
        || row
            .campaign
            .as_ref()
            .is_some_and(|c| filters.campaign_ids.contains(&c.id))
}

fn is_monetary(metric: &str) -> bool {
    common_formula(metric).is_some_and(|f| f.unit == KpiUnit::Currency)
}

/// Errors that a fallback cannot paper over because the request itself is wrong.
pub(crate) fn is_request_error(error: &EngineError) -> bool {
    match error {
        EngineError::Objective(_) => true,
        EngineError::Currency(e) => !e.is_data_error(),
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fixtures::*;
    use configuration::{BenchmarkConfig, UnknownCurrencyPolicy};
    use core_types::AccountProfile;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    pub fn account(industry: &str, currency: &str, clicks: u64) -> AccountMetrics {
        AccountMetrics {
            profile: AccountProfile {
                account_id: Uuid::new_v4(),
                name: format!("{industry} {clicks}"),
                industry: industry.to_string(),
                sub_industry: None,
                platform: "meta".to_string(),
                currency: currency.to_string(),
                funnel_stage: None,
                user_journey: None,
                has_pixel_data: true,
            },
            aggregates: vec![MetricAggregate {
                clicks,
                ..row(date(2, 10), currency, dec!(100))
            }],
        }
    }

    pub fn query(industry: Option<&str>) -> BenchmarkQuery {
        BenchmarkQuery {
            range: q1(),
            filters: MetricFilters {
                industry: industry.map(str::to_string),
                ..MetricFilters::default()
            },
            objective: Objective::Leads,
        }
    }

    /// Four retail accounts with CTR 1, 2, 3 and 4 percent.
    pub fn retail_population() -> Vec<AccountMetrics> {
        [100, 200, 300, 400]
            .into_iter()
            .map(|clicks| account("retail", "SAR", clicks))
            .collect()
    }

    #[test]
    fn live_benchmarks_classify_the_selected_account() {
        let mut population = retail_population();
        let star = account("retail", "SAR", 350);
        let mut q = query(None);
        q.filters.account_ids = vec![star.profile.account_id];
        population.push(star);

        let result = engine().industry_benchmarks(&q, &population, &rates()).unwrap();
        assert!(!result.fallback);
        let retail = &result.industries["retail"];
        assert_eq!(retail.accounts_count, 5);

        let ctr = &retail.metrics["ctr"];
        assert_eq!(ctr.actual, Some(dec!(3.5)));
        assert_eq!(ctr.sample_size, 5);
        assert_eq!(ctr.status, PerformanceStatus::Good);
        assert_eq!(
            ctr.benchmark,
            Some(MetricRange {
                min: dec!(2),
                avg: dec!(3),
                max: dec!(3.5)
            })
        );
    }

    #[test]
    fn group_aggregate_is_the_actual_without_account_filters() {
        let result = engine()
            .industry_benchmarks(&query(None), &retail_population(), &rates())
            .unwrap();
        let ctr = &result.industries["retail"].metrics["ctr"];
        assert_eq!(ctr.actual, Some(dec!(2.5)));
        assert_eq!(ctr.benchmark.unwrap().avg, dec!(2.5));
        assert_eq!(ctr.status, PerformanceStatus::BelowAverage);
    }

    #[test]
    fn single_account_industry_has_no_data() {
        let population = vec![account("finance", "USD", 120)];
        let result = engine()
            .industry_benchmarks(&query(None), &population, &rates())
            .unwrap();
        for metric in result.industries["finance"].metrics.values() {
            assert_eq!(metric.status, PerformanceStatus::NoData);
            assert_eq!(metric.benchmark, None);
        }
    }

    #[test]
    fn empty_population_falls_back_to_static_data() {
        let result = engine()
            .industry_benchmarks_or_fallback(&query(Some("Real Estate")), &retail_population(), &rates())
            .unwrap();
        assert!(result.fallback);
        assert_eq!(result.currency, "SAR");
        assert_eq!(result.industries.len(), 1);
        let cpl = &result.industries["real_estate"].metrics["cpl"];
        assert_eq!(cpl.benchmark.unwrap().avg, dec!(95));
        assert_eq!(cpl.status, PerformanceStatus::NoData);
    }

    #[test]
    fn failed_aggregation_falls_back() {
        let mut population = retail_population();
        population[0].aggregates[0].spend = dec!(-1);
        let result = engine()
            .industry_benchmarks_or_fallback(&query(None), &population, &rates())
            .unwrap();
        assert!(result.fallback);
        assert_eq!(result.industries.len(), FALLBACK_BENCHMARKS.len());
    }

    #[test]
    fn static_money_is_converted_to_the_reporting_currency() {
        let usd_rates =
            ExchangeRates::new("USD", "v1", [("SAR".to_string(), dec!(0.25))]).unwrap();
        let result = engine().fallback_benchmarks(&query(Some("finance")), &usd_rates);
        assert_eq!(result.currency, "USD");
        let finance = &result.industries["finance"];
        assert_eq!(finance.metrics["cpc"].benchmark.unwrap().avg, dec!(1.5));
        assert_eq!(finance.metrics["ctr"].benchmark.unwrap().avg, dec!(0.9));

        let no_sar = ExchangeRates::reporting_only("EUR").unwrap();
        let result = engine().fallback_benchmarks(&query(Some("finance")), &no_sar);
        assert_eq!(result.currency, "SAR");
    }

    #[test]
    fn strict_currency_errors_are_not_hidden() {
        let population = vec![account("retail", "JPY", 100), account("retail", "SAR", 100)];
        let err = engine()
            .industry_benchmarks_or_fallback(&query(None), &population, &rates())
            .unwrap_err();
        assert!(matches!(err, EngineError::Currency(_)));

        let lenient = BenchmarkEngine::from_parts(
            UnknownCurrencyPolicy::TreatAsReporting,
            BenchmarkConfig::default(),
        );
        let result = lenient
            .industry_benchmarks_or_fallback(&query(None), &population, &rates())
            .unwrap();
        assert!(!result.fallback);
    }

    #[test]
    fn configured_dimensions_refine_groups() {
        let config = BenchmarkConfig {
            default_dimensions: vec!["platform".to_string()],
            ..BenchmarkConfig::default()
        };
        let engine = BenchmarkEngine::from_parts(UnknownCurrencyPolicy::Strict, config);
        let result = engine
            .industry_benchmarks(&query(None), &retail_population(), &rates())
            .unwrap();
        assert!(result.industries.contains_key("retail/platform=meta"));
    }
}
