//! Tracing subscriber setup.
//!
//! Log lines go to stderr so stdout carries only command output. `RUST_LOG`
//! takes precedence; otherwise `--verbose` selects `debug` for the valcon
//! crates and the default is `warn`.
use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str = "warn,valcon_core=debug,valcon=debug";
const DEFAULT_FILTER: &str = "warn";

/// Returns the filter directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .ok();
}
