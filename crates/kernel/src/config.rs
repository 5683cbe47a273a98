//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

use crate::listing::{DEFAULT_LIMIT, MAX_LIMIT};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Expose `/api/debug/menus` (default: false).
    pub debug_endpoints: bool,

    /// Page size used when a request omits `limit`, clamped to 1..=50
    /// (default: 10).
    pub listing_default_limit: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let debug_endpoints = lookup("DEBUG_ENDPOINTS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let listing_default_limit = lookup("LISTING_DEFAULT_LIMIT")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("LISTING_DEFAULT_LIMIT must be a valid u32")?
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            debug_endpoints,
            listing_default_limit,
        })
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/carte")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.cors_allowed_origins, vec!["*"]);
        assert!(!config.debug_endpoints);
        assert_eq!(config.listing_default_limit, 10);
    }

    #[test]
    fn database_url_is_required() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn default_limit_is_clamped() {
        let high = load(&[("DATABASE_URL", "x"), ("LISTING_DEFAULT_LIMIT", "500")]).unwrap();
        assert_eq!(high.listing_default_limit, 50);

        let zero = load(&[("DATABASE_URL", "x"), ("LISTING_DEFAULT_LIMIT", "0")]).unwrap();
        assert_eq!(zero.listing_default_limit, 1);

        assert!(load(&[("DATABASE_URL", "x"), ("LISTING_DEFAULT_LIMIT", "ten")]).is_err());
    }

    #[test]
    fn parses_origins_and_debug_flag() {
        let config = load(&[
            ("DATABASE_URL", "x"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("DEBUG_ENDPOINTS", "TRUE"),
        ])
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.debug_endpoints);
    }
}
