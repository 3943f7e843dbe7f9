// Path: crates/telemetry/src/logging.rs
use tracing_subscriber::EnvFilter;

/// Installs the process-wide `tracing` subscriber. Idempotent: calling this
/// more than once (e.g. from tests) is harmless, the second attempt is
/// simply ignored.
///
/// Log level defaults to `info` and is overridable via `RUST_LOG`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
