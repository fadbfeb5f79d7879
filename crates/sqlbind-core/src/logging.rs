//! Tracing subscriber setup.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "SQLBIND_LOG";

const DEFAULT_FILTER: &str = "sqlbind=info";

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_FILTER);
}

/// Install the subscriber, falling back to `default_filter` when
/// `SQLBIND_LOG` is unset or invalid.
pub fn init_tracing_with_default(default_filter: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        // Another subscriber may already be installed by the host.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
