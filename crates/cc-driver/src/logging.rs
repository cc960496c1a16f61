//! Diagnostic logging for the four binaries, independent of the compiler's
//! own `cc-diag` error sink: this is internal tracing for debugging the
//! toolchain itself, not user-facing compiler output. `RUST_LOG` is
//! honored as a power-user override but never changes compiler output or
//! exit codes — it only widens or narrows what gets traced to stderr.

use tracing_subscriber::EnvFilter;

pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
