use crate::{error::AppError, AppState};
use analyzer::neutral_insight;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use core_types::{
    AccountMetrics, DateRange, Granularity, MetricAggregate, MetricFilters, Objective,
};
use currency::ExchangeRates;
use database::MetricQuery;
use engine::{
    objective_catalog, BenchmarkQuery, EngineError, IndustryBenchmarks, InsightReport,
    InsightScope, KpiSummary, ObjectiveInfo, SpendBreakdownRow, TimeseriesPoint,
    TimeseriesRequest,
};
use objectives::ObjectiveError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Objective used by the benchmark endpoints when the request names none.
const DEFAULT_BENCHMARK_OBJECTIVE: Objective = Objective::Leads;

/// Range and filters shared by every metrics endpoint. List filters are
/// comma-separated.
#[derive(Debug, Deserialize)]
pub struct ScopeParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub account_ids: Option<String>,
    pub campaign_ids: Option<String>,
    pub platforms: Option<String>,
    pub industry: Option<String>,
}

impl ScopeParams {
    fn range(&self) -> Result<DateRange, AppError> {
        DateRange::new(self.start_date, self.end_date).map_err(|e| EngineError::from(e).into())
    }

    fn filters(&self) -> Result<MetricFilters, AppError> {
        let account_ids = split_list(self.account_ids.as_deref())
            .into_iter()
            .map(|id| {
                Uuid::parse_str(&id)
                    .map_err(|_| AppError::BadRequest(format!("'{id}' is not a valid account id")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MetricFilters {
            account_ids,
            campaign_ids: split_list(self.campaign_ids.as_deref()),
            platforms: split_list(self.platforms.as_deref()),
            industry: self
                .industry
                .as_deref()
                .map(str::trim)
                .filter(|i| !i.is_empty())
                .map(str::to_string),
        })
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_objective(raw: &str) -> Result<Objective, AppError> {
    raw.parse::<Objective>().map_err(|_| {
        EngineError::from(ObjectiveError::InvalidObjective(raw.to_string())).into()
    })
}

#[derive(Debug, Deserialize)]
pub struct ObjectiveParams {
    pub objective: String,
}

#[derive(Debug, Deserialize)]
pub struct TimeseriesParams {
    pub metric: String,
    pub objective: String,
    pub granularity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BenchmarkParams {
    pub objective: Option<String>,
    /// Insights only: report on this single account.
    pub account_id: Option<Uuid>,
}

impl BenchmarkParams {
    fn objective(&self) -> Result<Objective, AppError> {
        self.objective
            .as_deref()
            .map_or(Ok(DEFAULT_BENCHMARK_OBJECTIVE), parse_objective)
    }
}

/// Daily rows and the rate snapshot for a scoped request.
async fn load_rows(
    state: &AppState,
    range: DateRange,
    filters: &MetricFilters,
) -> Result<(Vec<MetricAggregate>, ExchangeRates), AppError> {
    let query = MetricQuery::daily(range, filters.clone());
    let rows = state.db_repo.fetch_metric_rows(&query).await?;
    let rates = state
        .db_repo
        .fetch_exchange_rates(&state.reporting_currency)
        .await?;
    Ok((rows, rates))
}

/// The benchmark population and rates. `None` when the database cannot
/// provide them, in which case the caller serves the fallback.
async fn load_population(
    state: &AppState,
    range: DateRange,
    industry: Option<&str>,
) -> Result<(Option<Vec<AccountMetrics>>, ExchangeRates), AppError> {
    let rates = match state.db_repo.fetch_exchange_rates(&state.reporting_currency).await {
        Ok(rates) => rates,
        Err(e) => {
            tracing::warn!(error = %e, "Exchange rates unavailable; using reporting currency only.");
            ExchangeRates::reporting_only(&state.reporting_currency)?
        }
    };
    match state.db_repo.fetch_account_metrics(range, industry).await {
        Ok(accounts) => Ok((Some(accounts), rates)),
        Err(e) => {
            tracing::warn!(error = %e, "Benchmark population unavailable.");
            Ok((None, rates))
        }
    }
}

/// # GET /api/objectives
pub async fn get_objectives() -> Json<Vec<ObjectiveInfo>> {
    Json(objective_catalog())
}

/// # GET /api/kpis/summary
pub async fn get_kpi_summary(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<ScopeParams>,
    Query(params): Query<ObjectiveParams>,
) -> Result<Json<KpiSummary>, AppError> {
    let objective = parse_objective(&params.objective)?;
    let range = scope.range()?;
    let filters = scope.filters()?;
    let (rows, rates) = load_rows(&state, range, &filters).await?;

    let summary = state
        .engine
        .summary(objective.as_str(), &range, &filters, &rows, &rates)?;
    Ok(Json(summary))
}

/// # GET /api/kpis/timeseries
pub async fn get_kpi_timeseries(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<ScopeParams>,
    Query(params): Query<TimeseriesParams>,
) -> Result<Json<Vec<TimeseriesPoint>>, AppError> {
    let objective = parse_objective(&params.objective)?;
    let granularity = match params.granularity.as_deref() {
        Some(raw) => raw.parse::<Granularity>().map_err(EngineError::from)?,
        None => Granularity::default(),
    };
    let range = scope.range()?;
    let filters = scope.filters()?;
    let request = TimeseriesRequest {
        metric: params.metric,
        objective: objective.as_str().to_string(),
        granularity,
    };
    let (rows, rates) = load_rows(&state, range, &filters).await?;

    let points = state
        .engine
        .timeseries(&request, &range, &filters, &rows, &rates)?;
    Ok(Json(points))
}

/// # GET /api/kpis/spend-breakdown
pub async fn get_spend_breakdown(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<ScopeParams>,
) -> Result<Json<Vec<SpendBreakdownRow>>, AppError> {
    let range = scope.range()?;
    let filters = scope.filters()?;
    let (rows, rates) = load_rows(&state, range, &filters).await?;

    let breakdown = state.engine.spend_breakdown(&range, &filters, &rows, &rates)?;
    Ok(Json(breakdown))
}

/// # GET /api/benchmarks/industry
///
/// Serves the static benchmarks whenever live ones cannot be produced. Only
/// invalid requests fail.
pub async fn get_industry_benchmarks(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<ScopeParams>,
    Query(params): Query<BenchmarkParams>,
) -> Result<Json<IndustryBenchmarks>, AppError> {
    let query = BenchmarkQuery {
        range: scope.range()?,
        filters: scope.filters()?,
        objective: params.objective()?,
    };
    let (population, rates) =
        load_population(&state, query.range, query.filters.industry.as_deref()).await?;

    let Some(accounts) = population else {
        return Ok(Json(state.engine.fallback_benchmarks(&query, &rates)));
    };

    // Percentile aggregation runs on the rayon pool.
    let engine = state.engine.clone();
    let task_query = query.clone();
    let task_rates = rates.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.industry_benchmarks_or_fallback(&task_query, &accounts, &task_rates)
    })
    .await;

    match outcome {
        Ok(result) => Ok(Json(result?)),
        Err(e) => {
            tracing::error!(error = %e, "Benchmark task failed; serving static benchmarks.");
            Ok(Json(state.engine.fallback_benchmarks(&query, &rates)))
        }
    }
}

/// # GET /api/benchmarks/insights
///
/// Scoped to `account_id` when given, else to `industry`, else ranks every
/// industry. Always returns at least one insight.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(scope): Query<ScopeParams>,
    Query(params): Query<BenchmarkParams>,
) -> Result<Json<InsightReport>, AppError> {
    let query = BenchmarkQuery {
        range: scope.range()?,
        filters: scope.filters()?,
        objective: params.objective()?,
    };
    let insight_scope = match (params.account_id, &query.filters.industry) {
        (Some(id), _) => InsightScope::Account(id),
        (None, Some(industry)) => InsightScope::Industry(industry.clone()),
        (None, None) => InsightScope::AllIndustries,
    };
    let neutral = || InsightReport {
        fallback: true,
        insights: vec![neutral_insight()],
    };

    let (population, rates) =
        load_population(&state, query.range, query.filters.industry.as_deref()).await?;
    let Some(accounts) = population else {
        return Ok(Json(neutral()));
    };

    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.insights(&query, &insight_scope, &accounts, &rates)
    })
    .await;

    match outcome {
        Ok(result) => Ok(Json(result?)),
        Err(e) => {
            tracing::error!(error = %e, "Insight task failed; serving neutral insight.");
            Ok(Json(neutral()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(account_ids: Option<&str>) -> ScopeParams {
        ScopeParams {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            account_ids: account_ids.map(str::to_string),
            campaign_ids: Some("c-1, c-2,,".to_string()),
            platforms: None,
            industry: Some("  ".to_string()),
        }
    }

    #[test]
    fn list_filters_are_split_and_trimmed() {
        let id = Uuid::new_v4();
        let filters = scope(Some(&id.to_string())).filters().unwrap();
        assert_eq!(filters.account_ids, vec![id]);
        assert_eq!(filters.campaign_ids, vec!["c-1", "c-2"]);
        assert!(filters.platforms.is_empty());
        assert_eq!(filters.industry, None);
    }

    #[test]
    fn malformed_account_id_is_a_bad_request() {
        let err = scope(Some("not-a-uuid")).filters().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut params = scope(None);
        std::mem::swap(&mut params.start_date, &mut params.end_date);
        let err = params.range().unwrap_err();
        assert!(matches!(err, AppError::Engine(e) if e.is_validation()));
    }

    #[test]
    fn benchmark_objective_defaults_to_leads() {
        let params = BenchmarkParams {
            objective: None,
            account_id: None,
        };
        assert_eq!(params.objective().unwrap(), Objective::Leads);

        let params = BenchmarkParams {
            objective: Some("rocket_science".to_string()),
            account_id: None,
        };
        assert!(params.objective().is_err());
    }

    #[test]
    fn unknown_objective_is_an_objective_error() {
        let err = parse_objective("rocket_science").unwrap_err();
        assert!(matches!(
            &err,
            AppError::Engine(EngineError::Objective(ObjectiveError::InvalidObjective(name)))
                if name == "rocket_science"
        ));
        assert!(matches!(err, AppError::Engine(e) if e.is_validation()));
    }
}
