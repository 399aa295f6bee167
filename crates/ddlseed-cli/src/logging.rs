use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

use crate::config::LoggingSettings;

/// Install the global subscriber: stderr output, RFC 3339 UTC timestamps,
/// `RUST_LOG` taking precedence over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|err| format!("invalid log level {:?}: {err}", settings.level))?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::rfc_3339());

    let registry = tracing_subscriber::registry().with(filter);
    let result = if settings.json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    result.map_err(|err| err.to_string())
}
