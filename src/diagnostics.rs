//! Internal diagnostics
//!
//! The facade reports its own problems (dropped entries, driver fallbacks,
//! rotations) through `tracing`. Libraries embedding it keep whatever
//! subscriber they already have; binaries can call `init_tracing`.

/// Initialize a stderr tracing subscriber for diagnostics
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output. `RUST_LOG` overrides both.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(filter)
        .try_init();
}
