use crate::band::BenchmarkOutcome;
use crate::error::BenchmarkError;
use crate::grouping::{DimensionSet, GroupKey};
use core_types::{AccountMetrics, DateRange, MetricAggregate, Objective};
use objectives::{create_calculator, ObjectiveCalculator};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Benchmarks for one peer group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBenchmarks {
    pub key: GroupKey,
    /// Accounts in the group, whether or not they had data in range.
    pub accounts_count: usize,
    /// Counters summed over every in-range row of the group.
    pub totals: MetricAggregate,
    pub metrics: BTreeMap<String, BenchmarkOutcome>,
}

impl GroupBenchmarks {
    pub fn outcome(&self, metric: &str) -> Option<&BenchmarkOutcome> {
        self.metrics.get(metric)
    }
}

/// Every group's benchmarks, ordered by group key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkTable {
    pub groups: Vec<GroupBenchmarks>,
}

impl BenchmarkTable {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&GroupBenchmarks> {
        self.groups.iter().find(|g| &g.key == key)
    }

    /// Groups belonging to an industry (case-insensitive).
    pub fn for_industry<'a>(&'a self, industry: &'a str) -> impl Iterator<Item = &'a GroupBenchmarks> {
        self.groups
            .iter()
            .filter(move |g| g.key.industry.eq_ignore_ascii_case(industry.trim()))
    }
}

/// Computes percentile benchmarks across a population of accounts.
///
/// The inputs must already be in `currency`, the reporting currency. Each account
/// contributes at most one sample per metric: its own KPI over its in-range
/// rows. Accounts whose KPI is undefined (zero denominator) contribute none.
pub struct BenchmarkAggregator {
    calculator: Box<dyn ObjectiveCalculator>,
    metrics: Vec<String>,
    min_accounts: usize,
    currency: String,
}

impl BenchmarkAggregator {
    pub fn new(
        objective: Objective,
        metrics: &[String],
        min_accounts: usize,
        currency: &str,
    ) -> Result<Self, BenchmarkError> {
        if min_accounts < 2 {
            return Err(BenchmarkError::InvalidMinimumPopulation(min_accounts));
        }
        let calculator = create_calculator(objective);
        if let Some(unknown) = metrics.iter().find(|m| calculator.formula(m).is_none()) {
            return Err(BenchmarkError::UnknownMetric(unknown.clone()));
        }
        Ok(Self {
            calculator,
            metrics: metrics.to_vec(),
            min_accounts,
            currency: currency.to_string(),
        })
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn min_accounts(&self) -> usize {
        self.min_accounts
    }

    /// Groups the accounts and computes one band per group and metric.
    ///
    /// Groups run in parallel and the table is only assembled once every
    /// group has finished. If any group fails, the whole computation fails.
    pub fn compute_benchmarks(
        &self,
        accounts: &[AccountMetrics],
        dimensions: &DimensionSet,
        range: &DateRange,
    ) -> Result<BenchmarkTable, BenchmarkError> {
        let mut grouped: BTreeMap<GroupKey, Vec<&AccountMetrics>> = BTreeMap::new();
        for account in accounts {
            grouped
                .entry(dimensions.key_for(&account.profile))
                .or_default()
                .push(account);
        }
        let grouped: Vec<(GroupKey, Vec<&AccountMetrics>)> = grouped.into_iter().collect();

        let groups = grouped
            .into_par_iter()
            .map(|(key, members)| self.compute_group(key, &members, range))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            accounts = accounts.len(),
            groups = groups.len(),
            start = %range.start,
            end = %range.end,
            "Computed benchmark table."
        );
        Ok(BenchmarkTable { groups })
    }

    fn compute_group(
        &self,
        key: GroupKey,
        members: &[&AccountMetrics],
        range: &DateRange,
    ) -> Result<GroupBenchmarks, BenchmarkError> {
        let mut in_range_per_account = Vec::with_capacity(members.len());
        for account in members {
            let rows: Vec<MetricAggregate> = account
                .aggregates
                .iter()
                .filter(|row| row.within(range))
                .cloned()
                .collect();
            for row in &rows {
                row.validate().map_err(|e| BenchmarkError::AggregationFailure {
                    group: key.to_string(),
                    reason: format!("account {}: {e}", account.profile.account_id),
                })?;
            }
            in_range_per_account.push(rows);
        }

        let mut metrics = BTreeMap::new();
        for metric in &self.metrics {
            let samples: Vec<Decimal> = in_range_per_account
                .iter()
                .filter_map(|rows| self.calculator.sample(metric, rows))
                .collect();
            metrics.insert(
                metric.clone(),
                BenchmarkOutcome::from_samples(&samples, self.min_accounts),
            );
        }

        let all_rows: Vec<MetricAggregate> = in_range_per_account.into_iter().flatten().collect();

        Ok(GroupBenchmarks {
            totals: MetricAggregate::total(&all_rows, &self.currency),
            accounts_count: members.len(),
            key,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::AccountProfile;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn march() -> DateRange {
        DateRange::new(date(1), date(31)).unwrap()
    }

    fn account(industry: &str, platform: &str, rows: Vec<MetricAggregate>) -> AccountMetrics {
        AccountMetrics {
            profile: AccountProfile {
                account_id: Uuid::new_v4(),
                name: format!("{industry} account"),
                industry: industry.to_string(),
                sub_industry: None,
                platform: platform.to_string(),
                currency: "SAR".to_string(),
                funnel_stage: None,
                user_journey: None,
                has_pixel_data: false,
            },
            aggregates: rows,
        }
    }

    /// A day's row with the given click-through rate on 1000 impressions.
    fn row_with_ctr(day: u32, clicks: u64) -> MetricAggregate {
        MetricAggregate {
            date: Some(date(day)),
            impressions: 1000,
            clicks,
            spend: dec!(100),
            leads: 4,
            ..MetricAggregate::empty("SAR")
        }
    }

    fn aggregator() -> BenchmarkAggregator {
        let metrics: Vec<String> = ["ctr", "cpc", "cpm", "cvr", "cpl"]
            .iter()
            .map(|m| m.to_string())
            .collect();
        BenchmarkAggregator::new(Objective::Leads, &metrics, 2, "SAR").unwrap()
    }

    #[test]
    fn single_account_group_has_no_bands() {
        let accounts = vec![account("retail", "meta", vec![row_with_ctr(5, 21)])];
        let table = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap();

        assert_eq!(table.len(), 1);
        let group = &table.groups[0];
        assert_eq!(group.accounts_count, 1);
        for outcome in group.metrics.values() {
            assert_eq!(*outcome, BenchmarkOutcome::InsufficientData { sample_size: 1 });
        }
    }

    #[test]
    fn ctr_quartiles_across_four_accounts() {
        let accounts: Vec<AccountMetrics> = [10, 20, 30, 40]
            .into_iter()
            .map(|clicks| account("retail", "meta", vec![row_with_ctr(10, clicks)]))
            .collect();
        let table = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap();

        let band = table.groups[0].outcome("ctr").and_then(|o| o.band()).copied().unwrap();
        assert_eq!(band.p25, dec!(1.75));
        assert_eq!(band.p50, dec!(2.5));
        assert_eq!(band.p75, dec!(3.25));
        assert_eq!(band.sample_size, 4);
        assert_eq!(table.groups[0].totals.clicks, 100);
    }

    #[test]
    fn group_without_rows_in_range_is_tagged_with_reporting_currency() {
        let mut usd_account = account("retail", "meta", vec![]);
        usd_account.profile.currency = "USD".to_string();
        let table = aggregator()
            .compute_benchmarks(&[usd_account], &DimensionSet::industry_only(), &march())
            .unwrap();

        let totals = &table.groups[0].totals;
        assert_eq!(totals.currency, "SAR");
        assert_eq!(totals.spend, Decimal::ZERO);
    }

    #[test]
    fn rows_outside_the_range_are_ignored() {
        let outside = MetricAggregate {
            date: NaiveDate::from_ymd_opt(2024, 4, 2),
            ..row_with_ctr(1, 900)
        };
        let accounts = vec![
            account("retail", "meta", vec![row_with_ctr(3, 10), outside]),
            account("retail", "meta", vec![row_with_ctr(4, 30)]),
        ];
        let table = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap();

        let band = table.groups[0].outcome("ctr").and_then(|o| o.band()).copied().unwrap();
        assert_eq!(band.p25, dec!(1.5));
        assert_eq!(band.p75, dec!(2.5));
        assert_eq!(table.groups[0].totals.clicks, 40);
    }

    #[test]
    fn accounts_without_a_denominator_do_not_sample() {
        let no_leads = MetricAggregate {
            leads: 0,
            ..row_with_ctr(2, 10)
        };
        let accounts = vec![
            account("retail", "meta", vec![row_with_ctr(2, 10)]),
            account("retail", "meta", vec![no_leads]),
        ];
        let table = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap();

        let group = &table.groups[0];
        assert_eq!(group.outcome("cpl").unwrap().sample_size(), 1);
        assert!(group.outcome("ctr").unwrap().band().is_some());
    }

    #[test]
    fn invalid_row_fails_the_whole_table() {
        let negative = MetricAggregate {
            spend: dec!(-5),
            ..row_with_ctr(2, 10)
        };
        let accounts = vec![
            account("retail", "meta", vec![row_with_ctr(2, 10)]),
            account("travel", "meta", vec![negative]),
        ];
        let err = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap_err();
        assert!(matches!(err, BenchmarkError::AggregationFailure { ref group, .. } if group == "travel"));
    }

    #[test]
    fn groups_split_by_requested_dimensions() {
        let accounts = vec![
            account("Retail", "meta", vec![row_with_ctr(2, 10)]),
            account("retail", "google", vec![row_with_ctr(2, 20)]),
        ];
        let by_platform = DimensionSet::industry_only().with(core_types::Dimension::Platform);
        let table = aggregator()
            .compute_benchmarks(&accounts, &by_platform, &march())
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.for_industry("RETAIL").count(), 2);

        let merged = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.groups[0].accounts_count, 2);
    }

    #[test]
    fn account_order_does_not_change_the_table() {
        let mut accounts: Vec<AccountMetrics> = [12, 7, 33, 18, 25]
            .into_iter()
            .map(|clicks| account("retail", "meta", vec![row_with_ctr(9, clicks)]))
            .collect();
        let forward = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap();
        accounts.reverse();
        let backward = aggregator()
            .compute_benchmarks(&accounts, &DimensionSet::industry_only(), &march())
            .unwrap();
        assert_eq!(forward.groups[0].metrics, backward.groups[0].metrics);
    }

    #[test]
    fn empty_population_is_an_empty_table() {
        let table = aggregator()
            .compute_benchmarks(&[], &DimensionSet::industry_only(), &march())
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn construction_is_validated() {
        let metrics = vec!["ctr".to_string()];
        assert_eq!(
            BenchmarkAggregator::new(Objective::Leads, &metrics, 1, "SAR").err(),
            Some(BenchmarkError::InvalidMinimumPopulation(1))
        );
        let unknown = vec!["ctr".to_string(), "vibes".to_string()];
        assert_eq!(
            BenchmarkAggregator::new(Objective::Leads, &unknown, 2, "SAR").err(),
            Some(BenchmarkError::UnknownMetric("vibes".to_string()))
        );
    }
}
