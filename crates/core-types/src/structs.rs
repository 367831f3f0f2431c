use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Campaign metadata attached to a metric row. The name and declared objective
/// drive the results-resolution policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignMeta {
    pub id: String,
    pub name: String,
    /// The objective string as reported by the ad network (e.g. "OUTCOME_LEADS").
    pub objective: Option<String>,
}

/// A sum of raw performance counters over some grouping key.
///
/// A daily row from the metrics store is an aggregate keyed by
/// (date, account, campaign). Summing aggregates keeps only the key fields
/// that all inputs agree on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregate {
    // Grouping key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<CampaignMeta>,

    // Monetary counters, denominated in `currency`
    pub currency: String,
    pub spend: Decimal,
    pub revenue: Decimal,

    // Count counters
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub leads: u64,
    #[serde(default)]
    pub calls: u64,
    #[serde(default)]
    pub purchases: u64,
    #[serde(default)]
    pub reach: u64,
    #[serde(default)]
    pub video_views: u64,
}

impl MetricAggregate {
    /// Creates a zeroed aggregate with no grouping key.
    pub fn empty(currency: &str) -> Self {
        Self {
            date: None,
            account_id: None,
            platform: None,
            campaign: None,
            currency: currency.to_string(),
            spend: Decimal::ZERO,
            revenue: Decimal::ZERO,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            leads: 0,
            calls: 0,
            purchases: 0,
            reach: 0,
            video_views: 0,
        }
    }

    /// Sums a slice of aggregates into a new one.
    ///
    /// The inputs are expected to share a currency; the result takes the first
    /// input's currency, or `fallback_currency` when the slice is empty.
    pub fn total(aggregates: &[MetricAggregate], fallback_currency: &str) -> Self {
        let Some(first) = aggregates.first() else {
            return Self::empty(fallback_currency);
        };

        let mut total = Self {
            date: first.date,
            account_id: first.account_id,
            platform: first.platform.clone(),
            campaign: first.campaign.clone(),
            ..Self::empty(&first.currency)
        };

        for agg in aggregates {
            if total.date != agg.date {
                total.date = None;
            }
            if total.account_id != agg.account_id {
                total.account_id = None;
            }
            if total.platform != agg.platform {
                total.platform = None;
            }
            if total.campaign != agg.campaign {
                total.campaign = None;
            }
            total.add_counters(agg);
        }

        total
    }

    fn add_counters(&mut self, other: &MetricAggregate) {
        self.spend = self.spend.saturating_add(other.spend);
        self.revenue = self.revenue.saturating_add(other.revenue);
        self.impressions = self.impressions.saturating_add(other.impressions);
        self.clicks = self.clicks.saturating_add(other.clicks);
        self.conversions = self.conversions.saturating_add(other.conversions);
        self.leads = self.leads.saturating_add(other.leads);
        self.calls = self.calls.saturating_add(other.calls);
        self.purchases = self.purchases.saturating_add(other.purchases);
        self.reach = self.reach.saturating_add(other.reach);
        self.video_views = self.video_views.saturating_add(other.video_views);
    }

    /// Rows without a date are treated as already scoped to the requested range.
    pub fn within(&self, range: &DateRange) -> bool {
        self.date.is_none_or(|d| range.contains(d))
    }

    /// Rejects rows that cannot take part in an aggregation.
    /// Revenue may be negative (refund adjustments); spend may not.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.currency.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "currency".to_string(),
                "currency code must not be empty".to_string(),
            ));
        }
        if self.spend.is_sign_negative() && !self.spend.is_zero() {
            return Err(CoreError::InvalidInput(
                "spend".to_string(),
                format!("negative spend {}", self.spend),
            ));
        }
        Ok(())
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Catalog entry for a connected advertising account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_id: Uuid,
    pub name: String,
    pub industry: String,
    #[serde(default)]
    pub sub_industry: Option<String>,
    pub platform: String,
    pub currency: String,
    #[serde(default)]
    pub funnel_stage: Option<String>,
    #[serde(default)]
    pub user_journey: Option<String>,
    #[serde(default)]
    pub has_pixel_data: bool,
}

/// An account together with its metric rows, as fed to the benchmark aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMetrics {
    pub profile: AccountProfile,
    pub aggregates: Vec<MetricAggregate>,
}

/// Row-level filters shared by every engine operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFilters {
    #[serde(default)]
    pub account_ids: Vec<Uuid>,
    #[serde(default)]
    pub campaign_ids: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl MetricFilters {
    /// Row-level match. The industry filter applies to account profiles and is
    /// checked with [`MetricFilters::matches_account`].
    pub fn matches(&self, agg: &MetricAggregate) -> bool {
        let account_ok = self.account_ids.is_empty()
            || agg.account_id.is_some_and(|id| self.account_ids.contains(&id));
        let campaign_ok = self.campaign_ids.is_empty()
            || agg
                .campaign
                .as_ref()
                .is_some_and(|c| self.campaign_ids.contains(&c.id));
        let platform_ok = self.platforms.is_empty()
            || agg.platform.as_ref().is_some_and(|p| {
                self.platforms.iter().any(|wanted| wanted.eq_ignore_ascii_case(p))
            });
        account_ok && campaign_ok && platform_ok
    }

    pub fn matches_account(&self, profile: &AccountProfile) -> bool {
        let industry_ok = self
            .industry
            .as_ref()
            .is_none_or(|i| i.eq_ignore_ascii_case(&profile.industry));
        let platform_ok = self.platforms.is_empty()
            || self
                .platforms
                .iter()
                .any(|p| p.eq_ignore_ascii_case(&profile.platform));
        industry_ok && platform_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn row(date: u32, account: Uuid, spend: Decimal, clicks: u64) -> MetricAggregate {
        MetricAggregate {
            date: Some(day(date)),
            account_id: Some(account),
            platform: Some("meta".to_string()),
            spend,
            clicks,
            ..MetricAggregate::empty("SAR")
        }
    }

    #[test]
    fn total_sums_counters_and_drops_disagreeing_keys() {
        let account = Uuid::new_v4();
        let rows = vec![row(1, account, dec!(10.5), 3), row(2, account, dec!(4.5), 7)];

        let total = MetricAggregate::total(&rows, "USD");

        assert_eq!(total.spend, dec!(15.0));
        assert_eq!(total.clicks, 10);
        assert_eq!(total.currency, "SAR");
        assert_eq!(total.account_id, Some(account));
        assert_eq!(total.platform.as_deref(), Some("meta"));
        assert_eq!(total.date, None);
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let account = Uuid::new_v4();
        let huge = Decimal::MAX / dec!(2);
        let mut rows = vec![row(1, account, huge, 1), row(2, account, huge, 1), row(3, account, huge, 1)];
        rows[0].revenue = Decimal::MIN;
        rows[1].revenue = dec!(-1);

        let total = MetricAggregate::total(&rows, "SAR");

        assert_eq!(total.spend, Decimal::MAX);
        assert_eq!(total.revenue, Decimal::MIN);
        assert_eq!(total.clicks, 3);
    }

    #[test]
    fn total_of_nothing_is_zeroed_in_fallback_currency() {
        let total = MetricAggregate::total(&[], "SAR");
        assert_eq!(total, MetricAggregate::empty("SAR"));
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(day(5), day(1)).is_err());
        let range = DateRange::new(day(1), day(5)).unwrap();
        assert_eq!(range.days(), 5);
        assert!(range.contains(day(5)));
        assert!(!range.contains(day(6)));
    }

    #[test]
    fn negative_spend_is_rejected_but_negative_revenue_is_not() {
        let mut agg = MetricAggregate::empty("SAR");
        agg.revenue = dec!(-20);
        assert!(agg.validate().is_ok());
        agg.spend = dec!(-1);
        assert!(agg.validate().is_err());
    }

    #[test]
    fn filters_match_on_account_campaign_and_platform() {
        let account = Uuid::new_v4();
        let mut agg = row(1, account, dec!(1), 1);
        agg.campaign = Some(CampaignMeta {
            id: "c-1".to_string(),
            name: "Ramadan leads".to_string(),
            objective: None,
        });

        let filters = MetricFilters {
            account_ids: vec![account],
            campaign_ids: vec!["c-1".to_string()],
            platforms: vec!["META".to_string()],
            industry: None,
        };
        assert!(filters.matches(&agg));

        let other = MetricFilters {
            campaign_ids: vec!["c-2".to_string()],
            ..Default::default()
        };
        assert!(!other.matches(&agg));
    }
}
