// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            auth: auth::AuthConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    ///
    /// This configuration is required for the service to function and
    /// is validated eagerly during startup.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        /// Startup will fail fast rather than continuing with incomplete
        /// or invalid configuration.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("GRAPHPASS_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs =
                optional_env_parse!("GRAPHPASS_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("GRAPHPASS_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("GRAPHPASS_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Authentication configuration
// ============================================================

mod auth {
    // ---
    use super::*;
    use crate::graphical::DEFAULT_TOLERANCE_PX;
    use crate::hasher::DEFAULT_HASH_COST;
    use crate::session::DEFAULT_TOKEN_EXPIRY_DAYS;

    /// Authentication tuning and secrets.
    ///
    /// The signing secret is security-critical and must be provided
    /// explicitly; everything else has sane defaults.
    #[derive(Debug, Clone)]
    pub struct AuthConfig {
        /// Secret used to sign session tokens.
        pub signing_secret: String,

        /// Session token lifetime. Defaults to 30 days.
        pub token_expiry: chrono::Duration,

        /// bcrypt cost factor. Defaults to 10.
        pub hash_cost: u32,

        /// Per-axis pixel tolerance for graphical password matching. Defaults to 15.
        pub graphical_tolerance_px: i32,
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the signing secret is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let signing_secret = required_env!("GRAPHPASS_JWT_SECRET");

            let expiry_days =
                optional_env_parse!("GRAPHPASS_TOKEN_EXPIRY_DAYS", i64, DEFAULT_TOKEN_EXPIRY_DAYS);
            let hash_cost = optional_env_parse!("GRAPHPASS_HASH_COST", u32, DEFAULT_HASH_COST);
            let graphical_tolerance_px =
                optional_env_parse!("GRAPHPASS_TOLERANCE_PX", i32, DEFAULT_TOLERANCE_PX);

            Ok(Self {
                signing_secret,
                token_expiry: chrono::Duration::days(expiry_days),
                hash_cost,
                graphical_tolerance_px,
            })
        }
    }
}
pub use auth::AuthConfig;

// ============================================================
// Tests
// ============================================================
