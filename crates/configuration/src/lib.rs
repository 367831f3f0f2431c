use crate::error::ConfigError;
use config::builder::DefaultState;
use config::ConfigBuilder;
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    BenchmarkConfig, Config, CurrencyConfig, DatabaseConfig, LoggingConfig, ServerConfig,
    UnknownCurrencyPolicy,
};

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional: every section has defaults, and any key can be
/// overridden from the environment as `ADBENCH_<SECTION>__<KEY>`
/// (e.g. `ADBENCH_SERVER__PORT=8080`).
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as [`load_config`] but reads the given file path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder().add_source(config::File::from(path).required(false));
    build(builder)
}

/// Layers the environment over the given sources, deserializes and validates.
pub(crate) fn build(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    let settings = builder
        .add_source(
            config::Environment::with_prefix("ADBENCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = settings.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let code = self.currency.reporting_currency.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::ValidationError(format!(
                "currency.reporting_currency must be a 3-letter code, got '{}'",
                self.currency.reporting_currency
            )));
        }

        if self.benchmarks.min_accounts < 2 {
            return Err(ConfigError::ValidationError(format!(
                "benchmarks.min_accounts must be at least 2, got {}",
                self.benchmarks.min_accounts
            )));
        }

        if self.benchmarks.metrics.is_empty() {
            return Err(ConfigError::ValidationError(
                "benchmarks.metrics must list at least one KPI".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.benchmarks.metrics.iter().find(|m| !seen.insert(m.as_str())) {
            return Err(ConfigError::ValidationError(format!(
                "benchmarks.metrics lists '{dup}' more than once"
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        build(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.currency.reporting_currency, "SAR");
        assert_eq!(config.benchmarks.min_accounts, 2);
        assert_eq!(config.currency.unknown_currency_policy, UnknownCurrencyPolicy::Strict);
        assert!(config.benchmarks.metrics.iter().any(|m| m == "ctr"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 8081

            [currency]
            unknown_currency_policy = "treat_as_reporting"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.currency.reporting_currency, "SAR");
        assert_eq!(
            config.currency.unknown_currency_policy,
            UnknownCurrencyPolicy::TreatAsReporting
        );
    }

    #[test]
    fn single_account_minimum_is_rejected() {
        let err = from_toml("[benchmarks]\nmin_accounts = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn malformed_reporting_currency_is_rejected() {
        let err = from_toml("[currency]\nreporting_currency = \"riyal\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn duplicate_benchmark_metrics_are_rejected() {
        let err = from_toml("[benchmarks]\nmetrics = [\"ctr\", \"ctr\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
