use axum::{routing::get, Router};
use configuration::Config;
use database::DbRepository;
use engine::BenchmarkEngine;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
    pub engine: BenchmarkEngine,
    pub reporting_currency: String,
}

impl AppState {
    pub fn new(db_repo: DbRepository, config: &Config) -> Self {
        Self {
            db_repo,
            engine: BenchmarkEngine::new(config),
            reporting_currency: config.currency.reporting_currency.trim().to_uppercase(),
        }
    }
}

/// The API routes with CORS and request tracing applied.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/objectives", get(handlers::get_objectives))
        .route("/api/kpis/summary", get(handlers::get_kpi_summary))
        .route("/api/kpis/timeseries", get(handlers::get_kpi_timeseries))
        .route("/api/kpis/spend-breakdown", get(handlers::get_spend_breakdown))
        .route("/api/benchmarks/industry", get(handlers::get_industry_benchmarks))
        .route("/api/benchmarks/insights", get(handlers::get_insights))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Connects to the database, applies migrations and serves the API until
/// Ctrl-C. Tracing must already be initialized by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let db_pool = database::connect(&config.database).await?;
    database::run_migrations(&db_pool).await?;
    let state = Arc::new(AppState::new(DbRepository::new(db_pool), &config));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        %addr,
        reporting_currency = %state.reporting_currency,
        "Web server started and listening."
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal.");
    }
}
