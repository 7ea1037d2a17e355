//! Tracing subscriber bootstrap.

use anyhow::Context;
use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .with_context(|| format!("invalid log level '{}'", settings.log_level)),
    }
}

/// Install the global tracing subscriber.
///
/// Returns `Ok(())` without changes if a subscriber is already installed, so tests and
/// the CLI may call this more than once.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().flatten_event(true).try_init().is_ok(),
    };

    if installed {
        tracing::info!(
            target: "bookshelf-telemetry",
            format = ?settings.log_format,
            level = %settings.log_level,
            "telemetry initialized"
        );
    }

    Ok(())
}
