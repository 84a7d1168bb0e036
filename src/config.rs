//! Runtime configuration read from the environment (and `.env`, if present).

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "customers.sqlite";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HOST must be an IP address, got {0:?}")]
    InvalidHost(String),
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("DATABASE_POOL_SIZE must be a positive number, got {0:?}")]
    InvalidPoolSize(String),
    #[error("DATABASE_URL must point to a database file, in-memory databases are not shared between pooled connections")]
    InMemoryDatabase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub database: DatabaseConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host.clone()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPoolSize(raw))?,
            None => DEFAULT_POOL_SIZE,
        };

        let url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        if url.trim() == ":memory:" {
            return Err(ConfigError::InMemoryDatabase);
        }

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            database: DatabaseConfig { url, pool_size },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.database.url, "customers.sqlite");
        assert_eq!(config.database.pool_size, 8);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_URL", "/tmp/crm.sqlite"),
            ("DATABASE_POOL_SIZE", "2"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.database.url, "/tmp/crm.sqlite");
        assert_eq!(config.database.pool_size, 2);
    }

    #[test]
    fn test_invalid_port() {
        assert_eq!(
            config_from(&[("PORT", "http")]),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            config_from(&[("PORT", "0")]),
            Err(ConfigError::InvalidPort("0".to_string()))
        );
    }

    #[test]
    fn test_invalid_pool_size() {
        assert_eq!(
            config_from(&[("DATABASE_POOL_SIZE", "0")]),
            Err(ConfigError::InvalidPoolSize("0".to_string()))
        );
    }

    #[test]
    fn test_invalid_host() {
        assert_eq!(
            config_from(&[("HOST", "localhost")]),
            Err(ConfigError::InvalidHost("localhost".to_string()))
        );
    }

    #[test]
    fn test_in_memory_database_rejected() {
        assert_eq!(
            config_from(&[("DATABASE_URL", ":memory:")]),
            Err(ConfigError::InMemoryDatabase)
        );
    }
}
