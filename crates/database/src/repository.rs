use crate::DbError;
use chrono::NaiveDate;
use core_types::{
    AccountMetrics, AccountProfile, CampaignMeta, DateRange, MetricAggregate, MetricFilters,
};
use currency::ExchangeRates;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow, Postgres};
use sqlx::{QueryBuilder, Row};
use std::collections::HashMap;
use uuid::Uuid;

/// A key the metrics query can group by. Counters are always summed per
/// currency as well, since amounts in different currencies cannot be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricGrouping {
    Date,
    Account,
    Campaign,
    Platform,
}

#[derive(Debug, Clone)]
pub struct MetricQuery {
    pub range: DateRange,
    pub filters: MetricFilters,
    pub group_by: Vec<MetricGrouping>,
}

impl MetricQuery {
    /// Daily rows per account and campaign: the finest grain stored.
    pub fn daily(range: DateRange, filters: MetricFilters) -> Self {
        Self {
            range,
            filters,
            group_by: vec![
                MetricGrouping::Date,
                MetricGrouping::Account,
                MetricGrouping::Campaign,
                MetricGrouping::Platform,
            ],
        }
    }

    fn groups(&self, grouping: MetricGrouping) -> bool {
        self.group_by.contains(&grouping)
    }
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Summed counters for the query's range and filters, one row per
    /// requested grouping and currency.
    pub async fn fetch_metric_rows(&self, query: &MetricQuery) -> Result<Vec<MetricAggregate>, DbError> {
        let mut qb = build_metric_query(query);
        let rows = qb.build().fetch_all(&self.pool).await?;
        let aggregates = rows
            .iter()
            .map(metric_row_to_aggregate)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rows = aggregates.len(), "Fetched metric rows.");
        Ok(aggregates)
    }

    /// Every connected account, optionally limited to one industry.
    pub async fn fetch_account_catalog(&self, industry: Option<&str>) -> Result<Vec<AccountProfile>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, name, industry, sub_industry, platform, currency,
                   funnel_stage, user_journey, has_pixel_data
            FROM ad_accounts
            WHERE $1::TEXT IS NULL OR LOWER(industry) = LOWER($1)
            ORDER BY industry, name
            "#,
        )
        .bind(industry)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<AccountProfile, DbError> {
                Ok(AccountProfile {
                    account_id: row.try_get("account_id")?,
                    name: row.try_get("name")?,
                    industry: row.try_get("industry")?,
                    sub_industry: row.try_get("sub_industry")?,
                    platform: row.try_get("platform")?,
                    currency: row.try_get::<String, _>("currency")?.trim().to_string(),
                    funnel_stage: row.try_get("funnel_stage")?,
                    user_journey: row.try_get("user_journey")?,
                    has_pixel_data: row.try_get("has_pixel_data")?,
                })
            })
            .collect()
    }

    /// The benchmark population: every account with its per-campaign totals
    /// over the range. Accounts without rows in range are included with no
    /// aggregates.
    pub async fn fetch_account_metrics(
        &self,
        range: DateRange,
        industry: Option<&str>,
    ) -> Result<Vec<AccountMetrics>, DbError> {
        let catalog = self.fetch_account_catalog(industry).await?;

        let query = MetricQuery {
            range,
            filters: MetricFilters {
                industry: industry.map(str::to_string),
                ..MetricFilters::default()
            },
            group_by: vec![MetricGrouping::Account, MetricGrouping::Campaign],
        };
        let mut by_account: HashMap<Uuid, Vec<MetricAggregate>> = HashMap::new();
        for aggregate in self.fetch_metric_rows(&query).await? {
            if let Some(account_id) = aggregate.account_id {
                by_account.entry(account_id).or_default().push(aggregate);
            }
        }

        Ok(catalog
            .into_iter()
            .map(|profile| AccountMetrics {
                aggregates: by_account.remove(&profile.account_id).unwrap_or_default(),
                profile,
            })
            .collect())
    }

    /// The latest rate per currency into `reporting_currency`.
    pub async fn fetch_exchange_rates(&self, reporting_currency: &str) -> Result<ExchangeRates, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (currency) currency, rate, effective_date
            FROM exchange_rates
            WHERE UPPER(reporting_currency) = UPPER($1)
            ORDER BY currency, effective_date DESC
            "#,
        )
        .bind(reporting_currency)
        .fetch_all(&self.pool)
        .await?;

        let mut latest: Option<NaiveDate> = None;
        let mut rates = Vec::with_capacity(rows.len());
        for row in &rows {
            let currency: String = row.try_get("currency")?;
            let rate: Decimal = row.try_get("rate")?;
            let effective: NaiveDate = row.try_get("effective_date")?;
            latest = latest.max(Some(effective));
            rates.push((currency.trim().to_string(), rate));
        }

        let version = latest.map_or_else(|| "none".to_string(), |d| d.to_string());
        let snapshot = ExchangeRates::new(reporting_currency, version, rates)?;
        tracing::debug!(
            reporting = %snapshot.reporting_currency(),
            version = %snapshot.version(),
            currencies = snapshot.currencies().len(),
            "Loaded exchange-rate snapshot."
        );
        Ok(snapshot)
    }
}

/// Builds the aggregation query. Ungrouped key columns are selected as typed
/// NULLs so every row decodes the same way.
pub(crate) fn build_metric_query(query: &MetricQuery) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");

    let mut group_columns: Vec<&str> = Vec::new();
    let mut select = |grouped: bool, expr: &'static str, null: &'static str, alias: &str| {
        if grouped {
            group_columns.push(expr);
        }
        format!("{} AS {alias}", if grouped { expr } else { null })
    };
    let keys = [
        select(query.groups(MetricGrouping::Date), "dm.metric_date", "NULL::DATE", "metric_date"),
        select(query.groups(MetricGrouping::Account), "dm.account_id", "NULL::UUID", "account_id"),
        select(query.groups(MetricGrouping::Platform), "dm.platform", "NULL::TEXT", "platform"),
        select(query.groups(MetricGrouping::Campaign), "c.campaign_id", "NULL::TEXT", "campaign_id"),
        select(query.groups(MetricGrouping::Campaign), "c.name", "NULL::TEXT", "campaign_name"),
        select(query.groups(MetricGrouping::Campaign), "c.objective", "NULL::TEXT", "campaign_objective"),
    ];
    qb.push(keys.join(", "));
    qb.push(
        r#",
            dm.currency AS currency,
            COALESCE(SUM(dm.spend), 0) AS spend,
            COALESCE(SUM(dm.revenue), 0) AS revenue,
            COALESCE(SUM(dm.impressions), 0)::BIGINT AS impressions,
            COALESCE(SUM(dm.clicks), 0)::BIGINT AS clicks,
            COALESCE(SUM(dm.conversions), 0)::BIGINT AS conversions,
            COALESCE(SUM(dm.leads), 0)::BIGINT AS leads,
            COALESCE(SUM(dm.calls), 0)::BIGINT AS calls,
            COALESCE(SUM(dm.purchases), 0)::BIGINT AS purchases,
            COALESCE(SUM(dm.reach), 0)::BIGINT AS reach,
            COALESCE(SUM(dm.video_views), 0)::BIGINT AS video_views
        FROM daily_metrics dm
        JOIN campaigns c ON c.campaign_id = dm.campaign_id
        JOIN ad_accounts a ON a.account_id = dm.account_id
        WHERE dm.metric_date BETWEEN "#,
    );
    qb.push_bind(query.range.start);
    qb.push(" AND ");
    qb.push_bind(query.range.end);

    let filters = &query.filters;
    if !filters.account_ids.is_empty() {
        qb.push(" AND dm.account_id = ANY(");
        qb.push_bind(filters.account_ids.clone());
        qb.push(")");
    }
    if !filters.campaign_ids.is_empty() {
        qb.push(" AND dm.campaign_id = ANY(");
        qb.push_bind(filters.campaign_ids.clone());
        qb.push(")");
    }
    if !filters.platforms.is_empty() {
        let platforms: Vec<String> = filters.platforms.iter().map(|p| p.to_lowercase()).collect();
        qb.push(" AND LOWER(dm.platform) = ANY(");
        qb.push_bind(platforms);
        qb.push(")");
    }
    if let Some(industry) = &filters.industry {
        qb.push(" AND LOWER(a.industry) = LOWER(");
        qb.push_bind(industry.clone());
        qb.push(")");
    }

    group_columns.push("dm.currency");
    qb.push(" GROUP BY ");
    qb.push(group_columns.join(", "));
    qb.push(" ORDER BY ");
    qb.push(group_columns.join(", "));
    qb
}

fn count(row: &PgRow, column: &'static str) -> Result<u64, DbError> {
    let value: i64 = row.try_get(column)?;
    u64::try_from(value).map_err(|_| DbError::OutOfRange { column, value })
}

fn metric_row_to_aggregate(row: &PgRow) -> Result<MetricAggregate, DbError> {
    let campaign_id: Option<String> = row.try_get("campaign_id")?;
    let campaign = match campaign_id {
        Some(id) => Some(CampaignMeta {
            id,
            name: row.try_get::<Option<String>, _>("campaign_name")?.unwrap_or_default(),
            objective: row.try_get("campaign_objective")?,
        }),
        None => None,
    };

    Ok(MetricAggregate {
        date: row.try_get("metric_date")?,
        account_id: row.try_get("account_id")?,
        platform: row.try_get("platform")?,
        campaign,
        currency: row.try_get::<String, _>("currency")?.trim().to_string(),
        spend: row.try_get("spend")?,
        revenue: row.try_get("revenue")?,
        impressions: count(row, "impressions")?,
        clicks: count(row, "clicks")?,
        conversions: count(row, "conversions")?,
        leads: count(row, "leads")?,
        calls: count(row, "calls")?,
        purchases: count(row, "purchases")?,
        reach: count(row, "reach")?,
        video_views: count(row, "video_views")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn ungrouped_keys_are_selected_as_nulls() {
        let query = MetricQuery {
            range: range(),
            filters: MetricFilters::default(),
            group_by: vec![MetricGrouping::Account],
        };
        let qb = build_metric_query(&query);
        let sql = qb.sql();
        assert!(sql.contains("dm.account_id AS account_id"));
        assert!(sql.contains("NULL::DATE AS metric_date"));
        assert!(sql.contains("NULL::TEXT AS campaign_id"));
        assert!(sql.contains("GROUP BY dm.account_id, dm.currency"));
        assert!(!sql.contains("ANY("));
    }

    #[test]
    fn filters_become_bound_predicates() {
        let query = MetricQuery {
            range: range(),
            filters: MetricFilters {
                account_ids: vec![Uuid::new_v4()],
                campaign_ids: vec!["c-1".to_string()],
                platforms: vec!["Meta".to_string()],
                industry: Some("retail".to_string()),
            },
            group_by: vec![],
        };
        let qb = build_metric_query(&query);
        let sql = qb.sql();
        assert!(sql.contains("BETWEEN $1 AND $2"));
        assert!(sql.contains("dm.account_id = ANY($3)"));
        assert!(sql.contains("dm.campaign_id = ANY($4)"));
        assert!(sql.contains("LOWER(dm.platform) = ANY($5)"));
        assert!(sql.contains("LOWER(a.industry) = LOWER($6)"));
        assert!(sql.contains("GROUP BY dm.currency"));
    }

    #[test]
    fn daily_query_groups_by_every_key() {
        let query = MetricQuery::daily(range(), MetricFilters::default());
        let qb = build_metric_query(&query);
        assert!(qb
            .sql()
            .contains("GROUP BY dm.metric_date, dm.account_id, dm.platform, c.campaign_id, c.name, c.objective, dm.currency"));
    }
}
