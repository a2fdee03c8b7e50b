use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging.
///
/// - Emits JSON logs via `tracing_subscriber`, filtered by `RUST_LOG`
///   (default `info`).
/// - Bridges `log` records into `tracing` so middleware that still uses
///   `log::info!` etc. is captured in the same stream.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // with_current_span + with_span_list ensures every event includes the
    // active span stack (request spans from tracing-actix-web).
    let formatting_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true);

    // Ignore errors if a subscriber was already set (e.g., tests).
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init();

    let _ = tracing_log::LogTracer::init();
}
