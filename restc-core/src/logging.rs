//! Structured logging setup using the `tracing` ecosystem.
//!
//! The file log receives everything the configured filter lets through. The
//! console (stderr) only shows warnings and errors unless verbose mode is on,
//! so CLI output on stdout stays readable. `RUST_LOG` overrides the
//! configured filter when set.

use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::constants::LOG_FILE_NAME;
use crate::error::{RcError, RcResult};

/// Crates raised to `debug` in verbose mode.
const VERBOSE_TARGETS: [&str; 3] = ["restc_core", "restc_api", "restc"];

/// Filter directive for `level`, with the restc crates at `debug` when
/// `verbose` is set.
pub fn filter_directive(level: &str, verbose: bool) -> String {
    if !verbose {
        return level.to_string();
    }
    VERBOSE_TARGETS
        .iter()
        .fold(level.to_string(), |acc, target| format!("{acc},{target}=debug"))
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: a daily-rotated file in `log_dir` (plain or
/// JSON per `config`) plus a compact stderr layer.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path, verbose: bool) -> RcResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let directive = filter_directive(&config.level, verbose);
    let console_level = if verbose { LevelFilter::TRACE } else { LevelFilter::WARN };

    let json_layer = config.json_output.then(|| {
        fmt::layer()
            .json()
            .with_writer(non_blocking.clone())
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });
    let plain_layer = (!config.json_output).then(|| {
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(build_filter(&directive))
        .with(console_layer().with_filter(console_level))
        .with(json_layer)
        .with(plain_layer)
        .try_init()
        .map_err(|e| RcError::Config(format!("failed to install logger: {e}")))?;

    tracing::debug!(filter = %directive, dir = %log_dir.display(), "logging initialized");

    Ok(LogGuard { _guard: guard })
}

/// Guard that keeps the non-blocking log writer alive.
/// Drop this to flush and close the log file.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Console-only logger, for tests and for when no log directory is available.
pub fn init_console_logging(level: &str, verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(&filter_directive(level, verbose)))
        .with(console_layer())
        .try_init();
}

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_directive_is_level() {
        assert_eq!(filter_directive("warn", false), "warn");
    }

    #[test]
    fn test_verbose_directive_raises_restc_crates() {
        assert_eq!(
            filter_directive("info", true),
            "info,restc_core=debug,restc_api=debug,restc=debug"
        );
    }

    #[test]
    fn test_console_logging_does_not_panic() {
        // Subsequent calls are no-ops.
        init_console_logging("debug", false);
        init_console_logging("not a directive ===", true);
    }
}
