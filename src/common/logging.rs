//! Ambient diagnostic logging, kept separate from the page/error contract.
//!
//! This crate emits `tracing` events at page creation, page faults, eviction,
//! dirty write-back, and close, but never installs a global subscriber on
//! its own: library code must not decide how (or whether) a binary wants to
//! format or route its logs. `init_logging` is offered as a convenience for
//! binaries and tests that just want a sensible default.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber` fmt layer reading `RUST_LOG` (default
/// `info`) as the global default subscriber. Intended for binaries and
/// integration tests, not for library code embedding this crate alongside
/// its own logging setup. Safe to call more than once: later calls are
/// no-ops, matching `tracing`'s own "first writer wins" global-default rule.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
