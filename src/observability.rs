use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize tracing with environment-based level filtering.
///
/// `format` selects structured JSON output (production) or the pretty
/// console layer (development). `RUST_LOG` wins over the configured
/// level when set.
pub fn init_observability(log_level: &str, format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_filter(env_filter))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_filter(env_filter),
            )
            .try_init()?;
    }

    tracing::info!(log_level, format, "Observability initialized");

    Ok(())
}
