//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::service::DEFAULT_MAX_ORDER_LINES;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Maximum number of lines in a single order
    pub order_max_lines: usize,

    /// Upper bound for every store call, in milliseconds
    pub store_timeout_ms: u64,

    /// `json` for structured logs, anything else for human-readable output
    pub log_format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 3000)?;
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let order_max_lines = parse_or(&lookup, "ORDER_MAX_LINES", DEFAULT_MAX_ORDER_LINES)?;
        if order_max_lines == 0 {
            return Err(ConfigError::InvalidValue("ORDER_MAX_LINES"));
        }

        let store_timeout_ms = parse_or(&lookup, "STORE_TIMEOUT_MS", 5000)?;
        if store_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("STORE_TIMEOUT_MS"));
        }

        let log_format = lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            order_max_lines,
            store_timeout_ms,
            log_format,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
