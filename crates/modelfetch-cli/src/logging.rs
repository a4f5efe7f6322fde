//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects `debug` and the
/// default is `warn`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // a subscriber installed earlier (tests) stays in place
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}
