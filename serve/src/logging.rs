//! Logging initialization: structured logs to stdout, filtered by `RUST_LOG`.
//!
//! Unlike a CLI, this is a long-running server with no "clean stdout for the reply" constraint,
//! so logs go straight to the console rather than to a file.

/// Initializes tracing. **RUST_LOG**: log level filter, e.g. `info`, `debug`,
/// `pipeline=debug,serve=debug`. Default: `info`.
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
