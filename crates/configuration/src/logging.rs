use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level`. When `config.directory` is set, a
/// second, ANSI-free layer writes to a daily-rolling `adbench.log` there; the
/// returned guard must be held for the life of the process or buffered lines
/// are lost on exit.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging(format!("invalid log filter '{}': {e}", config.level)))?;

    let stdout_layer = fmt::layer().with_target(true);

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "adbench.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;

            tracing::info!(directory = %directory.display(), "File logging enabled.");
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            Ok(None)
        }
    }
}
