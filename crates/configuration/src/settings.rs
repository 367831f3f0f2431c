use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub currency: CurrencyConfig,
    pub benchmarks: BenchmarkConfig,
    pub logging: LoggingConfig,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection pool tuning. The connection URL itself is read from `DATABASE_URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Upper bound for a single metrics query, applied as `statement_timeout`.
    pub statement_timeout_secs: u64,
}

/// What to do with an amount whose currency has no rate in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum UnknownCurrencyPolicy {
    /// Surface the error to the caller.
    #[default]
    Strict,
    /// Keep the amount as if it were already in the reporting currency.
    TreatAsReporting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// ISO code every cross-account figure is normalized into.
    pub reporting_currency: String,
    pub unknown_currency_policy: UnknownCurrencyPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Groups with fewer contributing accounts than this get no band.
    pub min_accounts: usize,
    /// KPIs that percentile bands are computed for.
    pub metrics: Vec<String>,
    /// Dimensions used to refine industry groups when a request names none.
    pub default_dimensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
            statement_timeout_secs: 30,
        }
    }
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            reporting_currency: "SAR".to_string(),
            unknown_currency_policy: UnknownCurrencyPolicy::Strict,
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            min_accounts: 2,
            metrics: ["ctr", "cpc", "cpm", "cvr", "cpl", "cpa", "roas"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_dimensions: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,adbench=debug".to_string(),
            directory: None,
        }
    }
}
