use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "APIFLOW_LOG";

/// Diagnostics go to stderr so stdout stays machine-readable.
/// `APIFLOW_LOG` wins over `RUST_LOG`; without either only warnings are shown.
pub fn init_tracing() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
