//! Environment variable names read by [`LoggerConfig::from_env`].
//!
//! These are purely helpers; loggers built in code never touch the
//! environment.
//!
//! [`LoggerConfig::from_env`]: crate::config::LoggerConfig::from_env

/// Context of the root logger, e.g. `billing-api`.
pub const SCOPELOG_CONTEXT_ENV: &str = "SCOPELOG_CONTEXT";

/// Initial scope of the root logger as a JSON object,
/// e.g. `{"region":"eu-west-1"}`.
pub const SCOPELOG_SCOPE_ENV: &str = "SCOPELOG_SCOPE";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
