//! Tracing setup: env filter from `RUST_LOG`, overridable by `--log-level`.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing once; later calls are no-ops.
pub fn init(level_override: Option<&str>) {
    let level = level_override.map(str::to_string);
    INIT.get_or_init(|| {
        let filter = level
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "warn".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
    });
}
