//! Runtime settings loaded via OrthoConfig.
//!
//! Every value can come from the environment (prefix `DICRI_`), a config
//! file, or CLI flags. The token signing secret is deliberately
//! injection-only: there is no hard-coded default anywhere in the crate.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/dicri";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DICRI")]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum connections in the database pool.
    pub pool_size: Option<u32>,
    /// Shared secret for signing session tokens.
    pub token_secret: Option<String>,
    /// Session token lifetime in seconds.
    pub token_ttl_seconds: Option<i64>,
}

impl AppConfig {
    /// Bind address, defaulting to port 8080 on all interfaces.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Database URL, defaulting to a local `dicri` database.
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Pool size, defaulting to 10 connections.
    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Token signing secret, if one was provided.
    pub fn token_secret(&self) -> Option<&str> {
        self.token_secret.as_deref()
    }

    /// Token lifetime, defaulting to one hour.
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS)
    }
}
