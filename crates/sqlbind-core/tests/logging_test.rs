//! Tracing setup is idempotent and tolerates a bad filter directive.

use sqlbind_core::logging::{init_tracing, init_tracing_with_default, LOG_ENV};

#[test]
fn test_init_tracing_twice_is_harmless() {
    init_tracing();
    init_tracing();
    init_tracing_with_default("not a [valid filter");
    tracing::info!(env = LOG_ENV, "tracing initialized");
    assert_eq!(LOG_ENV, "SQLBIND_LOG");
}
