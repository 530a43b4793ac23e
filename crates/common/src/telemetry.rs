//! Tracing subscriber initialization.

use crate::config::LogConfig;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. JSON output is meant
/// for deployed environments; the default pretty output for local runs.
pub fn init(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|err| anyhow::anyhow!("init tracing subscriber: {err}"))
}
