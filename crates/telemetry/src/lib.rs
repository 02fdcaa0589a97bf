//! Logging and tracing bootstrap.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;
use vitrine_kernel::settings::{LogFormat, TelemetrySettings};

/// Build the event filter, preferring `RUST_LOG` over the configured directive.
pub fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    resolve_filter(from_env.as_deref(), &settings.filter)
}

fn resolve_filter(from_env: Option<&str>, configured: &str) -> EnvFilter {
    if let Some(filter) = from_env.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return filter;
    }
    EnvFilter::try_new(configured).unwrap_or_else(|err| {
        // Logging is not up yet.
        eprintln!("invalid log filter '{}': {}", configured, err);
        EnvFilter::new("info")
    })
}

/// Install the global tracing subscriber. Logs go to stderr so stdout stays
/// free for command output.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_writer(std::io::stderr);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {}", err))?;

    tracing::debug!(
        target: "vitrine-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}
