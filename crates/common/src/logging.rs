//! Logging and tracing initialization.

use std::sync::Mutex;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` overrides the configured level when set. When `config.file`
/// is set, output goes to that file without ANSI colors.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_file = config.file.as_ref().and_then(|path| {
        std::fs::File::create(path)
            .map_err(|e| eprintln!("Cannot open log file {:?}: {}", path, e))
            .ok()
    });

    match (config.json, log_file) {
        (true, Some(file)) => install(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .with_writer(Mutex::new(file))
                .finish(),
        ),
        (true, None) => install(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .finish(),
        ),
        (false, Some(file)) => install(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish(),
        ),
        (false, None) => install(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        ),
    }
}

fn install(subscriber: impl tracing::Subscriber + Send + Sync + 'static) {
    // First caller wins; tests may race to install and that is fine.
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
