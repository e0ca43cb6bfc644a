//! Tracing configuration.
//!
//! ```bash
//! VUE2SAN_LOG=debug vue2san src/
//! VUE2SAN_LOG="san_transformer::script=trace" vue2san App.vue
//! ```
//!
//! The subscriber is only initialised when `VUE2SAN_LOG` (or `RUST_LOG`) is
//! set. All output goes to stderr so it never mixes with `--stdout` output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "VUE2SAN_LOG";

/// Build an `EnvFilter` from `VUE2SAN_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var(LOG_ENV) {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
pub fn init_tracing() {
    let has_own_log = std::env::var(LOG_ENV).is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .init();
}
