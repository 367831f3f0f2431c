use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use configuration::{load_config, Config, UnknownCurrencyPolicy};
use core_types::{DateRange, MetricFilters, Objective};
use database::{connect, run_migrations, DbRepository, MetricQuery};
use engine::{BenchmarkEngine, BenchmarkQuery, IndustryBenchmarks, KpiSummary};
use rust_decimal::Decimal;

/// The main entry point for the benchmark engine.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env file loaded: {e}");
    }

    let cli = Cli::parse();
    let mut config = load_config().context("Failed to load configuration")?;
    if let Some(policy) = cli.currency_policy {
        config.currency.unknown_currency_policy = policy;
    }
    let _log_guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config).await
        }
        Commands::Benchmarks(args) => handle_benchmarks(args, &config).await,
        Commands::Summary(args) => handle_summary(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Ad-performance KPIs and industry benchmarks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overrides `currency.unknown_currency_policy` from the config.
    #[arg(long, global = true, value_enum)]
    currency_policy: Option<UnknownCurrencyPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print industry benchmarks for a date range.
    Benchmarks(BenchmarksArgs),
    /// Print the KPI summary for an objective.
    Summary(SummaryArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct BenchmarksArgs {
    /// First day of the range (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the range, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,

    /// Limit the peer population to one industry.
    #[arg(long)]
    industry: Option<String>,

    /// Decides how results-based KPIs are computed.
    #[arg(long, default_value = "leads")]
    objective: Objective,
}

#[derive(Parser)]
struct SummaryArgs {
    /// Campaign objective (e.g. "leads", "website_sales").
    #[arg(long)]
    objective: Objective,

    #[arg(long)]
    from: NaiveDate,

    #[arg(long)]
    to: NaiveDate,

    /// Print the summary as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn open_repository(config: &Config) -> anyhow::Result<DbRepository> {
    let pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(DbRepository::new(pool))
}

async fn handle_benchmarks(args: BenchmarksArgs, config: &Config) -> anyhow::Result<()> {
    let range = DateRange::new(args.from, args.to)?;
    let repo = open_repository(config).await?;
    let engine = BenchmarkEngine::new(config);

    let (accounts, rates) = futures::try_join!(
        repo.fetch_account_metrics(range, args.industry.as_deref()),
        repo.fetch_exchange_rates(&config.currency.reporting_currency),
    )?;
    tracing::info!(accounts = accounts.len(), rates = %rates.version(), "Loaded benchmark population.");

    let query = BenchmarkQuery {
        range,
        filters: MetricFilters {
            industry: args.industry,
            ..MetricFilters::default()
        },
        objective: args.objective,
    };
    let benchmarks = engine.industry_benchmarks_or_fallback(&query, &accounts, &rates)?;
    let source = if benchmarks.fallback { "static" } else { "live" };
    println!(
        "Benchmarks ({source}) for objective '{}' in {}",
        benchmarks.objective, benchmarks.currency
    );
    println!("{}", benchmarks_table(&benchmarks));
    Ok(())
}

async fn handle_summary(args: SummaryArgs, config: &Config) -> anyhow::Result<()> {
    let range = DateRange::new(args.from, args.to)?;
    let repo = open_repository(config).await?;
    let engine = BenchmarkEngine::new(config);

    let query = MetricQuery::daily(range, MetricFilters::default());
    let (rows, rates) = futures::try_join!(
        repo.fetch_metric_rows(&query),
        repo.fetch_exchange_rates(&config.currency.reporting_currency),
    )?;

    let summary = engine.summary(
        args.objective.as_str(),
        &range,
        &MetricFilters::default(),
        &rows,
        &rates,
    )?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("KPI summary for '{}' in {}", summary.objective, summary.currency);
        println!("{}", summary_table(&summary));
    }
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn cell(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn benchmarks_table(benchmarks: &IndustryBenchmarks) -> Table {
    let mut table = new_table(&[
        "Group", "Metric", "Actual", "Low", "Typical", "High", "Status", "Score",
    ]);
    for (group, entry) in &benchmarks.industries {
        for (metric, m) in &entry.metrics {
            table.add_row(vec![
                format!("{group} ({} accounts)", entry.accounts_count),
                metric.clone(),
                cell(m.actual),
                cell(m.benchmark.map(|b| b.min)),
                cell(m.benchmark.map(|b| b.avg)),
                cell(m.benchmark.map(|b| b.max)),
                m.status.to_string(),
                cell(m.performance),
            ]);
        }
    }
    table
}

fn summary_table(summary: &KpiSummary) -> Table {
    let mut table = new_table(&["KPI", "Value", "Tier"]);
    for (name, value) in summary.kpis.iter() {
        let tier = if summary.primary_kpis.iter().any(|k| *k == name) {
            "primary"
        } else if summary.secondary_kpis.iter().any(|k| *k == name) {
            "secondary"
        } else {
            ""
        };
        table.add_row(vec![name.to_string(), value.to_string(), tier.to_string()]);
    }
    table
}
