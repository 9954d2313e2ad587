//! Tracing subscriber setup shared by all binaries.

use tracing_subscriber::EnvFilter;

/// Initialize the console tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` selects debug-level output
/// for helpline crates and info for everything else.
pub fn init_tracing(debug: bool) {
    let default_directive = if debug { "info,helpline=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // try_init: tests may install a subscriber more than once.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
