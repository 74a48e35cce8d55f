use crate::config::toml_config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Picks the layer and level from the `[logging]` section. `verbose` forces debug.
pub fn init_logger(logging: &LoggingConfig, verbose: bool) {
    let level = effective_level(logging, verbose);
    if logging.is_json() {
        init_json_logger(level);
    } else {
        init_compact_logger(level);
    }
}

fn effective_level(logging: &LoggingConfig, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        logging.level.as_str()
    }
}

/// Used before any configuration has been read.
pub fn init_cli_logger(verbose: bool) {
    init_compact_logger(if verbose { "debug" } else { "info" });
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("saju_engine={}", level)))
}

fn init_compact_logger(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Structured logs for batch runs whose output is collected by a log shipper.
fn init_json_logger(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}
