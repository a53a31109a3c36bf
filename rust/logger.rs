use std::env;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout is reserved for the report.
pub fn init_logging(debug: bool) {
    let level = if debug {
        "debug".to_string()
    } else {
        env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()).to_lowercase()
    };

    let filter = match env::var("RUST_LOG") {
        Ok(rust_log) if !debug => EnvFilter::new(rust_log),
        _ => EnvFilter::new(level),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
