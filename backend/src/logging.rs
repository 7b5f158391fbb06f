//! Logging setup: console output plus an optional rolling log file.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured console level. The
/// returned guard flushes the file writer and must be kept alive until exit.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(scoped_directives(&config.console_level))
            .with_context(|| format!("Invalid console log level '{}'", config.console_level))?,
    };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(console_filter);

    let Some(prefix) = &config.file_prefix else {
        tracing_subscriber::registry().with(console).init();
        return Ok(None);
    };

    let file_filter = EnvFilter::try_new(scoped_directives(&config.file_level))
        .with_context(|| format!("Invalid file log level '{}'", config.file_level))?;

    let file_appender = tracing_appender::rolling::daily(&config.directory, prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .init();

    Ok(Some(guard))
}

/// Expand a bare level into directives for this crate and the HTTP stack.
fn scoped_directives(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("icsfilter_server={level},tower_http={level},warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped() {
        assert_eq!(
            scoped_directives("debug"),
            "icsfilter_server=debug,tower_http=debug,warn"
        );
    }

    #[test]
    fn test_directives_pass_through() {
        assert_eq!(scoped_directives("icsfilter_server=trace"), "icsfilter_server=trace");
    }
}
