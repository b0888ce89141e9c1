//! Tracing subscriber setup for hosts and tests.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`
/// with debug output for the mapper.
///
/// Returns false when a global subscriber was already installed, so it is
/// safe to call more than once.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let filter = match "satchel_core=debug".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_ok()
}
