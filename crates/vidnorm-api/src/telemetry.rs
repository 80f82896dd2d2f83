use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use vidnorm_core::Config;

/// Initialize tracing once per process.
///
/// Console: compact format (message string for convenience). The default
/// filter can be overridden with `RUST_LOG`.
pub fn init_telemetry(_config: &Config) -> Result<(), anyhow::Error> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidnorm=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .init();

    Ok(())
}
