//! Environment configuration
//!
//! Read once at startup from the process environment (after `.env` is
//! loaded by `dotenvy`).

use std::str::FromStr;

use thiserror::Error;

use super::database::{DatabaseConfig, DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS};

const DEV_JWT_SECRET: &str = "fleet-monitor-development-secret-change-me";
/// One year
const MAX_JWT_EXPIRE_HOURS: i64 = 8760;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Environment configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// `None` runs the service on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub jwt_expire_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        _ => Ok(default),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let is_production = environment == "production";

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if is_production => return Err(ConfigError::Missing("JWT_SECRET")),
            None => DEV_JWT_SECRET.to_string(),
        };

        let database = match lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig::new(url).with_pool_size(
                parse(&lookup, "DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?,
                parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            )),
            None => None,
        };

        let bcrypt_cost = parse(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let jwt_expire_hours = parse(&lookup, "JWT_EXPIRE_HOURS", 24)?;
        if !(1..=MAX_JWT_EXPIRE_HOURS).contains(&jwt_expire_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRE_HOURS",
                value: jwt_expire_hours.to_string(),
            });
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "APP_PORT", 3000)?,
            database,
            jwt_secret,
            jwt_expire_hours,
            bcrypt_cost,
            cors_origins,
            request_timeout_secs: parse(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
        })
    }

    /// Configuration for tests and local tooling: in-memory store, fast hashing.
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database: None,
            jwt_secret: "test-secret".to_string(),
            jwt_expire_hours: 1,
            bcrypt_cost: 4,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
