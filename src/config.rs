use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::CustomError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 5;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, CustomError> {
        dotenv().ok(); // Load environment variables

        let database_url = env::var("DATABASE_URL")
            .map_err(|e| CustomError::EnvError("DATABASE_URL".to_string(), e))?;
        Self::from_vars(database_url, |key| env::var(key).ok())
    }

    /// Builds a config from an already resolved database url and a lookup for
    /// the optional pool settings.
    pub fn from_vars<F>(database_url: String, lookup: F) -> Result<Self, CustomError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let min_connections = parse_or(&lookup, "DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?;
        let idle_timeout_secs =
            parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS)?;

        if min_connections > max_connections {
            return Err(CustomError::ConfigError(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                min_connections, max_connections
            )));
        }

        Ok(Config {
            database_url,
            max_connections,
            min_connections,
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CustomError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| {
                CustomError::ConfigError(format!("{} is not a valid number: '{}'", key, raw))
            }),
        None => Ok(default),
    }
}
