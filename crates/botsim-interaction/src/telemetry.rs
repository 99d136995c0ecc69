//! Log output for test runs.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Variable holding the filter directives, e.g. `BOTSIM_LOG=botsim_server=debug`.
pub const LOG_ENV: &str = "BOTSIM_LOG";

static INIT: OnceLock<()> = OnceLock::new();

/// Installs a fmt subscriber filtered by `BOTSIM_LOG` (default `info`).
///
/// Safe to call from every test; only the first call installs anything, and
/// an already installed global subscriber is left alone.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
