//! Stable error codes shared by all error enums.

/// Maps an error to a stable, machine-readable code.
pub trait SqlbindErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const CACHE_CORRUPTION: &str = "CACHE_CORRUPTION";
pub const INVARIANT_VIOLATION: &str = "INVARIANT_VIOLATION";
pub const THREAD_POOL: &str = "THREAD_POOL";
pub const CONFIG_IO: &str = "CONFIG_IO";
pub const CONFIG_PARSE: &str = "CONFIG_PARSE";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
pub const BIND_COUNT_MISMATCH: &str = "BIND_COUNT_MISMATCH";
pub const BIND_ORDER_MISMATCH: &str = "BIND_ORDER_MISMATCH";
pub const BIND_STRICT_TYPE: &str = "BIND_STRICT_TYPE";
pub const BIND_CONVERSION: &str = "BIND_CONVERSION";
pub const BIND_NO_READER: &str = "BIND_NO_READER";
pub const BIND_SCHEMA: &str = "BIND_SCHEMA";
pub const REDIRECT_DUPLICATE_LOCATION: &str = "REDIRECT_DUPLICATE_LOCATION";
pub const REDIRECT_OPTED_OUT: &str = "REDIRECT_OPTED_OUT";
