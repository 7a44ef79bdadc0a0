//! tracing subscriber setup
//!
//! Logs go to a rolling file (JSON optional) and, in text mode, to stdout.
//! Connection strings never reach the log stream: config.rs logs them as
//! [REDACTED], and sqlx statement logging is capped at warn here so bind
//! values stay out of the audit trail.

use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default directives applied beneath the configured level: full detail for
/// this crate, quiet drivers.
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("warn,wallet_ledger={level},sqlx=warn"))
}

fn file_appender(config: &AppConfig) -> RollingFileAppender {
    match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    }
}

/// Initialize the global subscriber. The returned guard must be held for
/// the process lifetime or buffered log lines are lost on shutdown.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(config));

    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        // JSON file output only: machine-shipped logs, no console mirror
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_scopes_crate_level() {
        // The configured level applies to this crate, not to every
        // dependency; drivers stay at warn
        let filter = default_filter("debug").to_string();
        assert!(filter.contains("wallet_ledger=debug"));
        assert!(filter.contains("sqlx=warn"));
    }
}
