//! Logging setup: `tracing` events to stderr via `tracing-subscriber`.
//!
//! `-v` raises the default level (info -> debug -> trace); `RUST_LOG`, when
//! set, replaces the default filter entirely.

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let default_level = level_for_verbosity(verbosity);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init logging: {}", e))
}
