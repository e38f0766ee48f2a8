//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process. Level via `RUST_LOG` (default `info`);
/// `LOG_FORMAT=plain` switches the JSON output to human-readable lines.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let plain = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("plain"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    if plain {
        let _ = builder.try_init();
    } else {
        let _ = builder.json().try_init();
    }
}
